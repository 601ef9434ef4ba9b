//! JSON payloads for presenters that plot the two point clouds themselves.
//!
//! A successful run becomes a [`PresenterPayload`]. A failed run becomes
//! `{"error": <PipelineError>, "message": "..."}` via [`error_to_json`],
//! so a consumer reading stdout always gets a JSON document.

use serde::{Deserialize, Serialize};

use contourmap_pipeline::{Components, Dimensions, MappingResult, PipelineError, PointSet};

/// Everything a plotting front end needs: the title, the source image
/// size, and both clouds as parallel `re`/`im` arrays.
///
/// Sets produced by [`contourmap_pipeline::process`] are always finite,
/// since a map yielding NaN or infinity fails the run with
/// [`PipelineError::NonFinite`]. For hand-built sets, `serde_json`
/// writes non-finite coordinates as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenterPayload {
    /// `"Map <name>"` or `"Cascade: A -> B"`.
    pub title: String,
    /// Size of the source image in pixels.
    pub dimensions: Dimensions,
    /// Normalized edge points before mapping.
    pub original: Components,
    /// The same points after the map or cascade, index-aligned with
    /// `original`.
    pub transformed: Components,
}

impl PresenterPayload {
    /// Split both point sets into parallel component arrays.
    #[must_use]
    pub fn new(original: &PointSet, mapped: &MappingResult, dimensions: Dimensions) -> Self {
        Self {
            title: mapped.title.clone(),
            dimensions,
            original: original.components(),
            transformed: mapped.points.components(),
        }
    }
}

/// Failure report: the structured error plus its display message.
#[derive(Debug, Serialize)]
struct ErrorPayload<'a> {
    error: &'a PipelineError,
    message: String,
}

/// Serialize the payload as pretty-printed JSON.
///
/// # Errors
///
/// Returns the underlying [`serde_json::Error`] if serialization fails.
pub fn to_json(
    original: &PointSet,
    mapped: &MappingResult,
    dimensions: Dimensions,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&PresenterPayload::new(original, mapped, dimensions))
}

/// Serialize a pipeline failure as pretty-printed JSON.
///
/// # Errors
///
/// Returns the underlying [`serde_json::Error`] if serialization fails.
pub fn error_to_json(error: &PipelineError) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ErrorPayload {
        error,
        message: error.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use contourmap_pipeline::ComplexPoint;

    fn sample() -> (PointSet, MappingResult) {
        let original = PointSet::new(vec![ComplexPoint::new(0.0, 1.0), ComplexPoint::new(-0.5, -0.5)]);
        let mapped = MappingResult {
            points: PointSet::new(vec![ComplexPoint::new(-1.0, 0.0), ComplexPoint::new(0.0, 0.5)]),
            title: "Map Quadratic".to_string(),
        };
        (original, mapped)
    }

    const DIMS: Dimensions = Dimensions {
        width: 4,
        height: 4,
    };

    #[test]
    fn payload_has_parallel_components() {
        let (original, mapped) = sample();
        let payload = PresenterPayload::new(&original, &mapped, DIMS);
        assert_eq!(payload.title, "Map Quadratic");
        assert_eq!(payload.original.re, vec![0.0, -0.5]);
        assert_eq!(payload.original.im, vec![1.0, -0.5]);
        assert_eq!(payload.transformed.re, vec![-1.0, 0.0]);
        assert_eq!(payload.transformed.im, vec![0.0, 0.5]);
    }

    #[test]
    fn json_field_names() {
        let (original, mapped) = sample();
        let json = to_json(&original, &mapped, DIMS).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Map Quadratic");
        assert_eq!(value["dimensions"]["width"], 4);
        assert_eq!(value["original"]["re"][1], -0.5);
        assert_eq!(value["transformed"]["im"][1], 0.5);
    }

    #[test]
    fn error_payload_is_structured() {
        let err = PipelineError::NonFinite {
            map: "Exponential".to_string(),
            count: 1,
        };
        let json = error_to_json(&err).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"]["NonFinite"]["map"], "Exponential");
        assert_eq!(value["error"]["NonFinite"]["count"], 1);
        assert_eq!(value["message"], err.to_string());

        let back: PipelineError = serde_json::from_value(value["error"].clone()).unwrap();
        assert!(matches!(back, PipelineError::NonFinite { ref map, count: 1 } if map == "Exponential"));
    }

    #[test]
    fn unit_error_variant_is_a_string() {
        let json = error_to_json(&PipelineError::EmptyMask).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "EmptyMask");
        assert_eq!(value["message"], "no edges found in the image");
    }

    #[test]
    fn non_finite_coordinates_become_null() {
        let original = PointSet::new(vec![ComplexPoint::ZERO]);
        let mapped = MappingResult {
            points: PointSet::new(vec![ComplexPoint::new(f64::INFINITY, 0.0)]),
            title: "Map Exponential".to_string(),
        };
        let json = to_json(&original, &mapped, DIMS).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["transformed"]["re"][0].is_null());
    }

    #[test]
    fn json_parses_back() {
        let (original, mapped) = sample();
        let json = to_json(&original, &mapped, DIMS).unwrap();
        let back: PresenterPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PresenterPayload::new(&original, &mapped, DIMS));
    }
}
