//! Image decoding and Canny edge extraction.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP), converts them to
//! grayscale, and runs [`imageproc::edges::canny`] to produce an
//! [`EdgeMask`]. The edge detector itself is treated as an opaque
//! operator; this module only owns decoding, threshold sanitizing, and
//! the empty-input guard.

use image::GrayImage;

use crate::mask::EdgeMask;
use crate::types::PipelineError;

/// Minimum allowed Canny threshold.
///
/// A threshold of zero marks every pixel with any gradient as a
/// candidate edge, and lets hysteresis walk into the zero-valued image
/// border.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Decode raw image bytes and convert to grayscale.
///
/// The standard luminance weighting is used for RGB-to-gray conversion.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

/// Run Canny on a grayscale image.
///
/// Returns a binary image: 255 for edge pixels, 0 for non-edge.
///
/// Both thresholds are clamped to at least [`MIN_THRESHOLD`], and
/// `low_threshold` is clamped to at most `high_threshold`, since
/// `imageproc` asserts `low <= high`.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    imageproc::edges::canny(image, low, high)
}

/// Decode `bytes` and extract a binary edge mask.
///
/// A load or decode failure is a hard stop: no mask is produced and
/// nothing downstream runs.
///
/// # Errors
///
/// See [`decode_and_grayscale`].
pub fn detect_edges(
    bytes: &[u8],
    low_threshold: f32,
    high_threshold: f32,
) -> Result<EdgeMask, PipelineError> {
    let gray = decode_and_grayscale(bytes)?;
    Ok(edge_mask(&gray, low_threshold, high_threshold))
}

/// Run [`canny`] on an already decoded image and wrap the result.
#[must_use]
pub fn edge_mask(gray: &GrayImage, low_threshold: f32, high_threshold: f32) -> EdgeMask {
    let mask = EdgeMask::new(canny(gray, low_threshold, high_threshold));
    tracing::debug!(
        width = mask.width(),
        height = mask.height(),
        edge_pixels = mask.foreground_count(),
        "edge detection complete",
    );
    mask
}
