//! contourmap-pipeline: edge extraction and complex-plane mapping (sans-IO).
//!
//! Turns a raster image into a cloud of complex points and re-renders it
//! under named complex maps:
//! decode -> Canny edge mask -> centered complex coordinates ->
//! normalization -> single map or cascade of maps.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. File access, the edge-mask
//! artifact, and presentation live in the `contourmap` binary and
//! `contourmap-export`.

pub mod cascade;
pub mod coords;
pub mod diagnostics;
pub mod edge;
pub mod mapping;
pub mod maps;
pub mod mask;
pub mod types;

#[cfg(test)]
mod test_support;

pub use mapping::{CASCADE_TOKEN, MapSelection, MappingResult};
pub use maps::{ComplexMap, EPSILON, MapFunction, MapKind, MapParams, MapRegistry, ParamOverride};
pub use mask::EdgeMask;
pub use types::{
    ComplexPoint, Components, Dimensions, PipelineConfig, PipelineError, PointSet, ProcessResult,
};

/// Run the full pipeline.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration,
/// then produces a [`ProcessResult`] holding the edge mask, the
/// normalized points, and the mapped points with their title.
///
/// # Pipeline steps
///
/// 1. Decode image and convert to grayscale
/// 2. Canny edge detection into an [`EdgeMask`]
/// 3. Lift foreground pixels into the complex plane and normalize
/// 4. Apply the selected map or cascade
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the thresholds are invalid.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::EmptyMask`] if edge detection finds nothing.
/// Returns mapping errors ([`PipelineError::UnknownMap`],
/// [`PipelineError::EmptyCascade`], [`PipelineError::InvalidParameter`],
/// [`PipelineError::NonFinite`]) from step 4.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<ProcessResult, PipelineError> {
    config.validate()?;

    // 1-2. Decode and detect edges.
    let edges = edge::detect_edges(image_bytes, config.canny_low, config.canny_high)?;
    let dimensions = edges.dimensions();

    // 3. Complex coordinates.
    let original = coords::to_normalized_points(&edges)?;

    // 4. Map or cascade.
    let mapped = mapping::apply_selection(
        &original,
        &config.selection,
        &config.overrides,
        MapRegistry::builtin(),
    )?;

    Ok(ProcessResult {
        edges,
        original,
        mapped,
        dimensions,
    })
}
