//! Ordered composition of named maps.
//!
//! A cascade string such as `"Quadratic, Inverse"` is split on commas,
//! each token trimmed, and the point set folded through the named maps
//! left to right. Every stage uses the map's registered defaults.
//!
//! The fold short-circuits: the first unknown name (or non-finite stage
//! output) aborts the whole cascade and no partially mapped set escapes.

use crate::mapping::MappingResult;
use crate::maps::{ComplexMap, MapRegistry};
use crate::types::{PipelineError, PointSet};

/// Separator between names in the cascade title.
const TITLE_SEPARATOR: &str = " -> ";

/// Split a raw cascade string into trimmed map names.
///
/// No registry lookup happens here. Interior empty tokens (e.g. from
/// `"Quadratic,,Inverse"`) are kept and later fail lookup.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyCascade`] if `raw` is empty or only
/// whitespace.
pub fn parse_names(raw: &str) -> Result<Vec<&str>, PipelineError> {
    if raw.trim().is_empty() {
        return Err(PipelineError::EmptyCascade);
    }
    Ok(raw.split(',').map(str::trim).collect())
}

/// Title for a cascade: `"Cascade: A -> B -> C"`.
#[must_use]
pub fn title(names: &[&str]) -> String {
    format!("Cascade: {}", names.join(TITLE_SEPARATOR))
}

/// Fold `points` through each named map in order.
///
/// # Errors
///
/// Returns [`PipelineError::UnknownMap`] for the first name missing
/// from `registry`, or [`PipelineError::NonFinite`] if a stage produces
/// NaN or infinite coordinates. Either way no points are returned.
pub fn fold(
    points: &PointSet,
    names: &[&str],
    registry: &MapRegistry,
) -> Result<PointSet, PipelineError> {
    names
        .iter()
        .try_fold(points.clone(), |current, &name| {
            let map = registry.resolve(name)?;
            let next = map.apply_checked(&current)?;
            tracing::debug!(stage = map.name(), points = next.len(), "cascade stage applied");
            Ok(next)
        })
}

/// Parse `raw` and apply the resulting cascade to `points`.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyCascade`] before any lookup if `raw` is
/// empty, otherwise whatever [`fold`] returns.
pub fn apply_cascade(
    points: &PointSet,
    raw: &str,
    registry: &MapRegistry,
) -> Result<MappingResult, PipelineError> {
    let names = parse_names(raw)?;
    let mapped = fold(points, &names, registry)?;
    Ok(MappingResult {
        points: mapped,
        title: title(&names),
    })
}
