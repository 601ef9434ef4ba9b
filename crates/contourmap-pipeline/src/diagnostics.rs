//! Pipeline diagnostics: timing and counts for each stage.
//!
//! [`process_with_diagnostics`] runs the same stages as
//! [`process`](crate::process) while recording how long each took and
//! what it produced. Time is read through the [`Clock`] trait so the
//! crate stays free of platform timing APIs and tests can inject a fake.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cascade;
use crate::coords;
use crate::edge;
use crate::mapping::{self, MapSelection};
use crate::maps::MapRegistry;
use crate::types::{Dimensions, PipelineConfig, PipelineError, ProcessResult};

/// Source of monotonic time.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Decode + grayscale conversion.
    pub decode: StageDiagnostics,
    /// Canny edge detection.
    pub edge_detection: StageDiagnostics,
    /// Mask to normalized complex points.
    pub coordinate_mapping: StageDiagnostics,
    /// Single map or cascade application.
    pub mapping: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
    },
    /// Canny edge detection metrics.
    EdgeDetection {
        /// Low threshold as configured.
        low_threshold: f32,
        /// High threshold as configured.
        high_threshold: f32,
        /// Number of foreground pixels in the mask.
        edge_pixel_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Coordinate mapping metrics.
    CoordinateMapping {
        /// Points extracted (one per foreground pixel).
        point_count: usize,
        /// Largest raw magnitude before normalization.
        max_magnitude: f64,
        /// Whether normalization was skipped (all points at the origin).
        degenerate: bool,
    },
    /// Map application metrics.
    Mapping {
        /// Result title.
        title: String,
        /// Number of maps applied (1 for a single map).
        stage_count: usize,
        /// Points in the mapped set.
        point_count: usize,
    },
}

/// High-level summary for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Points carried through the maps.
    pub point_count: usize,
    /// Title of the mapped result.
    pub title: String,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}  |  {}",
            self.summary.image_width, self.summary.image_height, self.summary.title,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Edge Detection", &self.edge_detection),
            ("Coordinate Mapping", &self.coordinate_mapping),
            ("Mapping", &self.mapping),
        ];

        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!("Points: {}", self.summary.point_count));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::EdgeDetection {
            low_threshold,
            high_threshold,
            edge_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *edge_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "low={low_threshold:.1} high={high_threshold:.1} edges={edge_pixel_count} ({density:.1}%)",
            )
        }
        StageMetrics::CoordinateMapping {
            point_count,
            max_magnitude,
            degenerate,
        } => {
            let suffix = if *degenerate { " (degenerate)" } else { "" };
            format!("{point_count} pts, max |z|={max_magnitude:.2}{suffix}")
        }
        StageMetrics::Mapping {
            title,
            stage_count,
            point_count,
        } => format!("{title} ({stage_count} stage(s), {point_count} pts)"),
    }
}

/// Number of maps a selection applies. Unparseable cascades count as 0.
fn stage_count(selection: &MapSelection) -> usize {
    match selection {
        MapSelection::Single { .. } => 1,
        MapSelection::Cascade { names } => cascade::parse_names(names).map_or(0, |n| n.len()),
    }
}

/// Run the full pipeline and collect per-stage diagnostics.
///
/// # Errors
///
/// Same as [`process`](crate::process).
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(ProcessResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let registry = MapRegistry::builtin();
    let run_start = clock.now();

    let start = clock.now();
    let gray = edge::decode_and_grayscale(image_bytes)?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: dimensions.width,
            height: dimensions.height,
        },
    };

    let start = clock.now();
    let edges = edge::edge_mask(&gray, config.canny_low, config.canny_high);
    let edge_detection = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::EdgeDetection {
            low_threshold: config.canny_low,
            high_threshold: config.canny_high,
            edge_pixel_count: edges.foreground_count(),
            total_pixel_count: dimensions.pixel_count(),
        },
    };

    let start = clock.now();
    let (original, max_magnitude) = coords::lift(&edges)?;
    let coordinate_mapping = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::CoordinateMapping {
            point_count: original.len(),
            max_magnitude,
            degenerate: max_magnitude <= 0.0,
        },
    };

    let start = clock.now();
    let mapped =
        mapping::apply_selection(&original, &config.selection, &config.overrides, registry)?;
    let mapping_stage = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Mapping {
            title: mapped.title.clone(),
            stage_count: stage_count(&config.selection),
            point_count: mapped.points.len(),
        },
    };

    let summary = PipelineSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        point_count: mapped.points.len(),
        title: mapped.title.clone(),
    };
    let diagnostics = PipelineDiagnostics {
        decode,
        edge_detection,
        coordinate_mapping,
        mapping: mapping_stage,
        total_duration: clock.elapsed(&run_start),
        summary,
    };

    Ok((
        ProcessResult {
            edges,
            original,
            mapped,
            dimensions,
        },
        diagnostics,
    ))
}
