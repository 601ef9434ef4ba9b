//! Side-by-side SVG comparison of two point clouds.
//!
//! The left panel shows the normalized edge points, the right panel the
//! same points after the map or cascade. Each panel is fitted to its own
//! bounding box because maps such as `Inverse` or `Exponential` change
//! the scale of the cloud by orders of magnitude.
//!
//! Every point becomes a zero-length path segment with a round cap, so a
//! cloud of any size is a single `<path>` per panel. The imaginary axis
//! is flipped to SVG's +Y-down convention at this boundary.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Group, Line, Path, Rectangle, Text as TextElement, Title};
use svg::node::Text;

use contourmap_pipeline::{ComplexPoint, MappingResult, PointSet};

/// Width and height of one square panel, in user units.
const PANEL_SIZE: f64 = 400.0;
/// Gap around and between panels.
const MARGIN: f64 = 20.0;
/// Vertical room above the panels for captions.
const CAPTION_HEIGHT: f64 = 28.0;
/// Diameter of a plotted point.
const POINT_SIZE: f64 = 2.0;

/// Metadata to embed in the SVG document.
///
/// When present, a `<title>` and/or `<desc>` element is emitted
/// immediately after the opening `<svg>` tag.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, typically the source image file name.
    pub title: Option<&'a str>,
    /// Document description, typically the pipeline configuration.
    pub description: Option<&'a str>,
}

/// Axis-aligned bounds of the finite points in a set.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min_re: f64,
    max_re: f64,
    min_im: f64,
    max_im: f64,
}

impl Bounds {
    fn of(points: &PointSet) -> Option<Self> {
        points
            .iter()
            .filter(|z| z.is_finite())
            .fold(None, |acc: Option<Self>, z| {
                Some(acc.map_or(
                    Self {
                        min_re: z.re,
                        max_re: z.re,
                        min_im: z.im,
                        max_im: z.im,
                    },
                    |b| Self {
                        min_re: b.min_re.min(z.re),
                        max_re: b.max_re.max(z.re),
                        min_im: b.min_im.min(z.im),
                        max_im: b.max_im.max(z.im),
                    },
                ))
            })
    }
}

/// Uniform complex-plane to panel transform.
#[derive(Debug, Clone, Copy)]
struct Fit {
    scale: f64,
    center_re: f64,
    center_im: f64,
    origin_x: f64,
    origin_y: f64,
}

impl Fit {
    /// Fit `bounds` into the panel whose top-left corner is `(x, y)`,
    /// leaving a small inner padding. A zero-size cloud is centered at
    /// unit scale.
    fn new(bounds: Bounds, x: f64, y: f64) -> Self {
        let span = (bounds.max_re - bounds.min_re).max(bounds.max_im - bounds.min_im);
        let usable = PANEL_SIZE - 2.0 * MARGIN;
        let scale = if span > f64::EPSILON { usable / span } else { 1.0 };
        Self {
            scale,
            center_re: f64::midpoint(bounds.min_re, bounds.max_re),
            center_im: f64::midpoint(bounds.min_im, bounds.max_im),
            origin_x: x + PANEL_SIZE / 2.0,
            origin_y: y + PANEL_SIZE / 2.0,
        }
    }

    fn project(&self, z: ComplexPoint) -> (f64, f64) {
        (
            (z.re - self.center_re).mul_add(self.scale, self.origin_x),
            (self.center_im - z.im).mul_add(self.scale, self.origin_y),
        )
    }
}

/// Build the scatter path for a set: one zero-length segment per finite
/// point. Returns `None` when nothing is drawable.
fn scatter_path(points: &PointSet, fit: &Fit) -> Option<Path> {
    let mut data = Data::new();
    let mut any = false;
    for z in points.iter().filter(|z| z.is_finite()) {
        data = data.move_to(fit.project(*z)).line_by((0.0, 0.0));
        any = true;
    }
    any.then(|| {
        Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", POINT_SIZE)
            .set("stroke-linecap", "round")
    })
}

/// Draw the real and imaginary axes where they cross the panel.
fn axes(bounds: Bounds, fit: &Fit, x: f64, y: f64) -> Group {
    let mut group = Group::new()
        .set("stroke", "#bbbbbb")
        .set("stroke-width", 0.5);
    let (origin_x, origin_y) = fit.project(ComplexPoint::ZERO);
    if (bounds.min_im..=bounds.max_im).contains(&0.0) {
        group = group.add(
            Line::new()
                .set("x1", x)
                .set("x2", x + PANEL_SIZE)
                .set("y1", origin_y)
                .set("y2", origin_y),
        );
    }
    if (bounds.min_re..=bounds.max_re).contains(&0.0) {
        group = group.add(
            Line::new()
                .set("x1", origin_x)
                .set("x2", origin_x)
                .set("y1", y)
                .set("y2", y + PANEL_SIZE),
        );
    }
    group
}

/// Render one captioned panel at horizontal offset `x`.
fn panel(points: &PointSet, caption: &str, x: f64) -> Group {
    let y = MARGIN + CAPTION_HEIGHT;
    let mut group = Group::new()
        .add(
            TextElement::new(caption)
                .set("x", x + PANEL_SIZE / 2.0)
                .set("y", MARGIN + CAPTION_HEIGHT / 2.0)
                .set("text-anchor", "middle")
                .set("font-family", "sans-serif")
                .set("font-size", 14),
        )
        .add(
            Rectangle::new()
                .set("x", x)
                .set("y", y)
                .set("width", PANEL_SIZE)
                .set("height", PANEL_SIZE)
                .set("fill", "white")
                .set("stroke", "black")
                .set("stroke-width", 1),
        );

    if let Some(bounds) = Bounds::of(points) {
        let fit = Fit::new(bounds, x, y);
        group = group.add(axes(bounds, &fit, x, y));
        if let Some(path) = scatter_path(points, &fit) {
            group = group.add(path);
        }
    }
    group
}

/// Render the original and mapped point clouds side by side.
///
/// The left panel is captioned "Original", the right one with the
/// mapping title (e.g. `"Cascade: Quadratic -> Inverse"`).
///
/// Results of [`contourmap_pipeline::process`] are always finite, since a
/// non-finite map output fails the run. Hand-built sets may carry NaN or
/// infinity; those points are left out of both the fit and the plot.
#[must_use]
pub fn to_comparison_svg(
    original: &PointSet,
    mapped: &MappingResult,
    metadata: &SvgMetadata<'_>,
) -> String {
    let width = 2.0f64.mul_add(PANEL_SIZE, 3.0 * MARGIN);
    let height = PANEL_SIZE + CAPTION_HEIGHT + 2.0 * MARGIN;

    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", format!("0 0 {width} {height}"));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    doc = doc
        .add(panel(original, "Original", MARGIN))
        .add(panel(
            &mapped.points,
            &mapped.title,
            2.0f64.mul_add(MARGIN, PANEL_SIZE),
        ));

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
