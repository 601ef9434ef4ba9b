//! Shared types for the contourmap pipeline.

use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::edge::MIN_THRESHOLD;
use crate::mapping::{MapSelection, MappingResult};
use crate::maps::ParamOverride;
use crate::mask::EdgeMask;

/// Re-export `GrayImage` so downstream crates can reference the edge
/// raster without depending on `image` directly.
pub use image::GrayImage;

/// A point in the complex plane.
///
/// Edge pixels are lifted into a coordinate system centered on the mask's
/// geometric center with the imaginary axis pointing up: row 0 of the
/// mask has the most positive imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexPoint {
    /// Real component (horizontal offset from center).
    pub re: f64,
    /// Imaginary component (vertical offset from center, +up).
    pub im: f64,
}

impl ComplexPoint {
    /// The additive identity `0 + 0i`.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// The multiplicative identity `1 + 0i`.
    pub const ONE: Self = Self::new(1.0, 0.0);

    /// Create a new complex point.
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// A purely real value `x + 0i`.
    #[must_use]
    pub const fn from_real(x: f64) -> Self {
        Self::new(x, 0.0)
    }

    /// Squared magnitude `re² + im²`.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn norm_sqr(self) -> f64 {
        self.re.mul_add(self.re, self.im * self.im)
    }

    /// Magnitude `|z|`.
    #[must_use]
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Multiply both components by a real factor.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.re * factor, self.im * factor)
    }

    /// Divide both components by a real divisor.
    #[must_use]
    pub fn unscale(self, divisor: f64) -> Self {
        Self::new(self.re / divisor, self.im / divisor)
    }

    /// `z²`.
    #[must_use]
    pub fn square(self) -> Self {
        Self::new(
            self.re.mul_add(self.re, -(self.im * self.im)),
            2.0 * self.re * self.im,
        )
    }

    /// Complex exponential `e^z = e^re (cos im + i sin im)`.
    #[must_use]
    pub fn exp(self) -> Self {
        let magnitude = self.re.exp();
        let (sin, cos) = self.im.sin_cos();
        Self::new(magnitude * cos, magnitude * sin)
    }

    /// Returns `true` if neither component is NaN or infinite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

impl Add for ComplexPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for ComplexPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for ComplexPoint {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re.mul_add(rhs.re, -(self.im * rhs.im)),
            self.re.mul_add(rhs.im, self.im * rhs.re),
        )
    }
}

impl Div for ComplexPoint {
    type Output = Self;

    /// Textbook complex division. A zero divisor yields non-finite
    /// components; callers regularize the divisor first.
    fn div(self, rhs: Self) -> Self {
        let denom = rhs.norm_sqr();
        Self::new(
            self.re.mul_add(rhs.re, self.im * rhs.im) / denom,
            self.im.mul_add(rhs.re, -(self.re * rhs.im)) / denom,
        )
    }
}

/// An ordered set of complex points, one per foreground pixel.
///
/// Order is irrelevant to the maps but is kept stable (row-major scan
/// order of the source mask) so runs are reproducible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointSet(Vec<ComplexPoint>);

impl PointSet {
    /// Create a new point set from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<ComplexPoint>) -> Self {
        Self(points)
    }

    /// Returns `true` if the set has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[ComplexPoint] {
        &self.0
    }

    /// Consumes the set and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<ComplexPoint> {
        self.0
    }

    /// Iterate over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, ComplexPoint> {
        self.0.iter()
    }

    /// Largest magnitude in the set, or `0.0` when empty.
    #[must_use]
    pub fn max_magnitude(&self) -> f64 {
        self.0
            .iter()
            .map(|z| z.norm())
            .fold(0.0, f64::max)
    }

    /// Number of points with a NaN or infinite component.
    #[must_use]
    pub fn non_finite_count(&self) -> usize {
        self.0.iter().filter(|z| !z.is_finite()).count()
    }

    /// Split the set into parallel real and imaginary sequences, the
    /// shape the presenter consumes.
    #[must_use]
    pub fn components(&self) -> Components {
        let (re, im) = self.0.iter().map(|z| (z.re, z.im)).unzip();
        Components { re, im }
    }
}

impl FromIterator<ComplexPoint> for PointSet {
    fn from_iter<I: IntoIterator<Item = ComplexPoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a ComplexPoint;
    type IntoIter = std::slice::Iter<'a, ComplexPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A point set as parallel real/imaginary sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    /// Real parts, index-aligned with `im`.
    pub re: Vec<f64>,
    /// Imaginary parts, index-aligned with `re`.
    pub im: Vec<f64>,
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count.
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Configuration for a single pipeline run.
///
/// # Canny threshold invariants
///
/// Both thresholds must be at least [`MIN_THRESHOLD`] and `canny_low`
/// must not exceed `canny_high`. [`validate`](Self::validate) reports
/// violations; [`edge::canny`](crate::edge::canny) also clamps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Canny low (hysteresis) threshold.
    pub canny_low: f32,

    /// Canny high (strong edge) threshold.
    pub canny_high: f32,

    /// Which map, or which cascade of maps, to apply.
    pub selection: MapSelection,

    /// Parameter overrides for a single-map selection. Ignored by
    /// cascades, which always use registered defaults.
    pub overrides: Vec<ParamOverride>,
}

impl PipelineConfig {
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 100.0;

    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 200.0;

    /// Check the Canny threshold invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if either threshold is
    /// below [`MIN_THRESHOLD`], non-finite, or `canny_low > canny_high`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.canny_low.is_finite() || !self.canny_high.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "canny thresholds must be finite".to_string(),
            ));
        }
        if self.canny_low < MIN_THRESHOLD || self.canny_high < MIN_THRESHOLD {
            return Err(PipelineError::InvalidConfig(format!(
                "canny thresholds must be at least {MIN_THRESHOLD}"
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(PipelineError::InvalidConfig(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            selection: MapSelection::default(),
            overrides: Vec::new(),
        }
    }
}

/// Result of running the full pipeline on one image.
///
/// Carries everything the presenter needs: the original edge mask, the
/// normalized points before mapping, and the mapped points with their
/// title.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Binary edge mask produced by edge detection.
    pub edges: EdgeMask,

    /// Normalized points extracted from the mask.
    pub original: PointSet,

    /// Points after the selected map or cascade, plus the title.
    pub mapped: MappingResult,

    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur during pipeline processing.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` variant is
/// serialized as its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Edge detection produced no foreground pixels.
    #[error("no edges found in the image")]
    EmptyMask,

    /// A requested map name is not in the registry.
    #[error("unknown map: {0:?}")]
    UnknownMap(String),

    /// Cascade mode was selected with an empty name list.
    #[error("cascade is empty: provide a comma-separated list of map names")]
    EmptyCascade,

    /// Cascade mode was selected but no cascade string was supplied.
    #[error("cascade selected but no cascade list was given")]
    MissingCascade,

    /// A parameter override was rejected.
    #[error("invalid parameter {parameter:?} for map {map}: {reason}")]
    InvalidParameter {
        /// Map the override was addressed to.
        map: String,
        /// Offending parameter name.
        parameter: String,
        /// Why the override was rejected.
        reason: String,
    },

    /// A map produced NaN or infinite coordinates.
    #[error("unexpected error: map {map} produced {count} non-finite point(s)")]
    NonFinite {
        /// Name of the map whose output was non-finite.
        map: String,
        /// How many points were affected.
        count: usize,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

/// Serde-compatible proxy for `PipelineError`.
///
/// `image::ImageError` does not implement serde, so the `ImageDecode`
/// variant stores its `Display` string instead. A deserialized
/// `ImageDecode` comes back as `InvalidConfig` carrying that message.
#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    ImageDecode(String),
    EmptyInput,
    EmptyMask,
    UnknownMap(String),
    EmptyCascade,
    MissingCascade,
    InvalidParameter {
        map: String,
        parameter: String,
        reason: String,
    },
    NonFinite {
        map: String,
        count: usize,
    },
    InvalidConfig(String),
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::EmptyMask => PipelineErrorProxy::EmptyMask,
            Self::UnknownMap(name) => PipelineErrorProxy::UnknownMap(name.clone()),
            Self::EmptyCascade => PipelineErrorProxy::EmptyCascade,
            Self::MissingCascade => PipelineErrorProxy::MissingCascade,
            Self::InvalidParameter {
                map,
                parameter,
                reason,
            } => PipelineErrorProxy::InvalidParameter {
                map: map.clone(),
                parameter: parameter.clone(),
                reason: reason.clone(),
            },
            Self::NonFinite { map, count } => PipelineErrorProxy::NonFinite {
                map: map.clone(),
                count: *count,
            },
            Self::InvalidConfig(s) => PipelineErrorProxy::InvalidConfig(s.clone()),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PipelineErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            PipelineErrorProxy::ImageDecode(msg) => {
                Self::InvalidConfig(format!("image decode error: {msg}"))
            }
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            PipelineErrorProxy::EmptyMask => Self::EmptyMask,
            PipelineErrorProxy::UnknownMap(name) => Self::UnknownMap(name),
            PipelineErrorProxy::EmptyCascade => Self::EmptyCascade,
            PipelineErrorProxy::MissingCascade => Self::MissingCascade,
            PipelineErrorProxy::InvalidParameter {
                map,
                parameter,
                reason,
            } => Self::InvalidParameter {
                map,
                parameter,
                reason,
            },
            PipelineErrorProxy::NonFinite { map, count } => Self::NonFinite { map, count },
            PipelineErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
        })
    }
}
