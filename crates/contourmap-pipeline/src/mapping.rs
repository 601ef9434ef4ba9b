//! Map selection and single-map application.
//!
//! The user picks either one registry map (optionally with parameter
//! overrides) or the literal token [`CASCADE_TOKEN`] together with a
//! comma-separated list of map names. [`apply_selection`] dispatches to
//! [`apply_single`] or [`cascade::apply_cascade`].

use serde::{Deserialize, Serialize};

use crate::cascade;
use crate::maps::{MapRegistry, ParamOverride};
use crate::types::{PipelineError, PointSet};

/// Selection token that switches to cascade mode.
pub const CASCADE_TOKEN: &str = "Cascade";

/// Which transformation to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapSelection {
    /// One registry map.
    Single {
        /// Registry key.
        name: String,
    },
    /// An ordered list of registry maps, as the raw comma-separated
    /// string the user typed.
    Cascade {
        /// Raw cascade string, e.g. `"Quadratic,Inverse"`.
        names: String,
    },
}

impl MapSelection {
    /// Build a selection from the user-facing pair: a map name (or
    /// [`CASCADE_TOKEN`]) and the raw cascade string.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingCascade`] if `selected` is
    /// [`CASCADE_TOKEN`] but `cascade` is `None`. A cascade list given
    /// with any other map is ignored with a warning.
    pub fn from_user(selected: &str, cascade: Option<&str>) -> Result<Self, PipelineError> {
        if selected == CASCADE_TOKEN {
            let names = cascade.ok_or(PipelineError::MissingCascade)?;
            Ok(Self::Cascade {
                names: names.to_string(),
            })
        } else {
            if cascade.is_some() {
                tracing::warn!(
                    map = selected,
                    "cascade list is ignored unless the selected map is {CASCADE_TOKEN:?}",
                );
            }
            Ok(Self::Single {
                name: selected.to_string(),
            })
        }
    }
}

impl Default for MapSelection {
    fn default() -> Self {
        Self::Single {
            name: "Quadratic".to_string(),
        }
    }
}

/// A mapped point set and the title describing how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    /// Transformed points, index-aligned with the input set.
    pub points: PointSet,
    /// `"Map <name>"` or `"Cascade: A -> B"`.
    pub title: String,
}

/// Apply one named map, with `overrides` replacing its defaults.
///
/// # Errors
///
/// Returns [`PipelineError::UnknownMap`] if `name` is not registered,
/// [`PipelineError::InvalidParameter`] if an override is rejected, or
/// [`PipelineError::NonFinite`] if the map produces non-finite points.
pub fn apply_single(
    points: &PointSet,
    name: &str,
    overrides: &[ParamOverride],
    registry: &MapRegistry,
) -> Result<MappingResult, PipelineError> {
    let map = registry.resolve_with(name, overrides)?;
    let mapped = map.apply_checked(points)?;
    tracing::debug!(map = name, params = ?map.params, points = mapped.len(), "map applied");
    Ok(MappingResult {
        points: mapped,
        title: format!("Map {name}"),
    })
}

/// Apply whatever `selection` names.
///
/// `overrides` only affect single-map selections; cascades always run
/// on registered defaults.
///
/// # Errors
///
/// See [`apply_single`] and [`cascade::apply_cascade`].
pub fn apply_selection(
    points: &PointSet,
    selection: &MapSelection,
    overrides: &[ParamOverride],
    registry: &MapRegistry,
) -> Result<MappingResult, PipelineError> {
    match selection {
        MapSelection::Single { name } => apply_single(points, name, overrides, registry),
        MapSelection::Cascade { names } => {
            if !overrides.is_empty() {
                tracing::warn!(
                    count = overrides.len(),
                    "parameter overrides are ignored in cascade mode",
                );
            }
            cascade::apply_cascade(points, names, registry)
        }
    }
}
