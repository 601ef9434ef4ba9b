//! contourmap-export: Pure presenter serializers (sans-IO)
//!
//! Converts an original/mapped point-cloud pair into output formats.
//! Currently supports a side-by-side SVG comparison and a JSON payload
//! with parallel real/imaginary sequences (or a structured error).

pub mod json;
pub mod svg;

pub use json::{PresenterPayload, error_to_json, to_json};
pub use svg::{SvgMetadata, to_comparison_svg};
