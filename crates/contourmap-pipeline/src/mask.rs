//! Binary edge mask produced by edge detection.
//!
//! An [`EdgeMask`] wraps the Canny output raster. Any nonzero pixel is
//! foreground (part of a contour); zero pixels are background. The mask
//! is immutable once built and is consumed by the coordinate mapper.

use image::GrayImage;

use crate::types::Dimensions;

/// A 2-D grid of binary intensities, one per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMask(GrayImage);

impl EdgeMask {
    /// Wrap a grayscale raster. Nonzero pixels are foreground.
    #[must_use]
    pub const fn new(image: GrayImage) -> Self {
        Self(image)
    }

    /// Build a mask from `(row, col)` foreground coordinates.
    ///
    /// Coordinates outside the `width` × `height` grid are ignored.
    #[must_use]
    pub fn from_foreground(width: u32, height: u32, pixels: &[(u32, u32)]) -> Self {
        let mut image = GrayImage::new(width, height);
        for &(row, col) in pixels {
            if row < height && col < width {
                image.put_pixel(col, row, image::Luma([255]));
            }
        }
        Self(image)
    }

    /// Mask width (number of columns).
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Mask height (number of rows).
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Mask dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Whether the pixel at `(row, col)` is foreground.
    ///
    /// Out-of-bounds coordinates are background.
    #[must_use]
    pub fn is_foreground(&self, row: u32, col: u32) -> bool {
        row < self.height() && col < self.width() && self.0.get_pixel(col, row).0[0] != 0
    }

    /// Iterate foreground pixels as `(row, col)` in row-major order.
    pub fn foreground(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] != 0)
            .map(|(x, y, _)| (y, x))
    }

    /// Number of foreground pixels.
    #[must_use]
    pub fn foreground_count(&self) -> u64 {
        self.0.pixels().map(|p| u64::from(p.0[0] != 0)).sum()
    }

    /// Borrow the underlying raster (for saving or display).
    #[must_use]
    pub const fn as_image(&self) -> &GrayImage {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_foreground_sets_requested_pixels() {
        let mask = EdgeMask::from_foreground(4, 4, &[(0, 2), (3, 1)]);
        assert!(mask.is_foreground(0, 2));
        assert!(mask.is_foreground(3, 1));
        assert!(!mask.is_foreground(2, 0));
        assert_eq!(mask.foreground_count(), 2);
    }

    #[test]
    fn out_of_bounds_pixels_are_ignored() {
        let mask = EdgeMask::from_foreground(3, 2, &[(5, 0), (0, 9)]);
        assert_eq!(mask.foreground_count(), 0);
        assert!(!mask.is_foreground(5, 0));
    }

    #[test]
    fn foreground_iterates_row_major() {
        let mask = EdgeMask::from_foreground(4, 4, &[(3, 1), (0, 2), (0, 0)]);
        let pixels: Vec<_> = mask.foreground().collect();
        assert_eq!(pixels, vec![(0, 0), (0, 2), (3, 1)]);
    }

    #[test]
    fn any_nonzero_intensity_is_foreground() {
        let mut image = GrayImage::new(2, 1);
        image.put_pixel(1, 0, image::Luma([1]));
        let mask = EdgeMask::new(image);
        assert!(mask.is_foreground(0, 1));
        assert!(!mask.is_foreground(0, 0));
    }

    #[test]
    fn dimensions_report_width_and_height() {
        let mask = EdgeMask::from_foreground(7, 3, &[]);
        assert_eq!(
            mask.dimensions(),
            Dimensions {
                width: 7,
                height: 3
            }
        );
    }
}
