//! Pixel-to-complex coordinate transform.
//!
//! Lifts every foreground pixel of an [`EdgeMask`] into the complex
//! plane, centered on the mask's geometric center, then scales the set so
//! its farthest point lies on the unit circle:
//!
//! ```text
//! z      = (col - W/2) + i·(H/2 - row)
//! z_norm = z / max|z|
//! ```
//!
//! The imaginary axis is flipped relative to the row axis so row 0 (top)
//! has the most positive imaginary part.

use crate::mask::EdgeMask;
use crate::types::{ComplexPoint, PipelineError, PointSet};

/// Complex coordinate of pixel `(row, col)` in a `width` × `height` grid.
#[must_use]
pub fn pixel_to_complex(row: u32, col: u32, width: u32, height: u32) -> ComplexPoint {
    let center_re = f64::from(width) / 2.0;
    let center_im = f64::from(height) / 2.0;
    ComplexPoint::new(f64::from(col) - center_re, center_im - f64::from(row))
}

/// Collect the raw (unnormalized) complex coordinates of every foreground
/// pixel, in row-major order.
#[must_use]
pub fn raw_points(mask: &EdgeMask) -> PointSet {
    let (width, height) = (mask.width(), mask.height());
    mask.foreground()
        .map(|(row, col)| pixel_to_complex(row, col, width, height))
        .collect()
}

/// Scale a point set so its maximum magnitude is 1.0.
///
/// When the maximum magnitude is zero (empty set, or every point at the
/// origin) the set is returned unchanged.
#[must_use]
pub fn normalize(points: PointSet) -> PointSet {
    let max_magnitude = points.max_magnitude();
    if max_magnitude > 0.0 {
        points
            .into_points()
            .into_iter()
            .map(|z| z.unscale(max_magnitude))
            .collect()
    } else {
        points
    }
}

/// Convert an edge mask into a normalized point set.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyMask`] if the mask has no foreground
/// pixels.
pub fn to_normalized_points(mask: &EdgeMask) -> Result<PointSet, PipelineError> {
    lift(mask).map(|(points, _)| points)
}

/// Like [`to_normalized_points`], but also returns the raw maximum
/// magnitude the set was divided by (0 for a degenerate set).
///
/// # Errors
///
/// Returns [`PipelineError::EmptyMask`] if the mask has no foreground
/// pixels.
pub fn lift(mask: &EdgeMask) -> Result<(PointSet, f64), PipelineError> {
    let raw = raw_points(mask);
    if raw.is_empty() {
        return Err(PipelineError::EmptyMask);
    }
    let max_magnitude = raw.max_magnitude();
    tracing::debug!(points = raw.len(), max_magnitude, "lifted mask into complex plane");
    Ok((normalize(raw), max_magnitude))
}
