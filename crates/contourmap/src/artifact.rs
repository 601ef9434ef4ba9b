//! Edge-mask artifact naming and writing.

use std::path::{Path, PathBuf};

use contourmap_pipeline::EdgeMask;

/// Prefix of the edge-mask artifact file name.
const PREFIX: &str = "bordes_";

/// Artifact file name for an input image: `bordes_<base>.png`, where
/// `<base>` is the input's file name up to its first `.`.
///
/// `photos/cat.small.jpg` becomes `bordes_cat.png`.
pub fn edge_artifact_name(input: &Path) -> String {
    let file_name = input
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let base = file_name.split_once('.').map_or(&*file_name, |(base, _)| base);
    format!("{PREFIX}{base}.png")
}

/// Write `edges` as a grayscale PNG into `out_dir`, named after `input`.
///
/// # Errors
///
/// Returns the encoder or filesystem error from [`image`].
pub fn save_edges(
    edges: &EdgeMask,
    input: &Path,
    out_dir: &Path,
) -> Result<PathBuf, image::ImageError> {
    let path = out_dir.join(edge_artifact_name(input));
    edges.as_image().save(&path)?;
    tracing::debug!(path = %path.display(), "edge mask written");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn simple_name() {
        assert_eq!(edge_artifact_name(Path::new("cat.png")), "bordes_cat.png");
    }

    #[test]
    fn directory_is_dropped() {
        assert_eq!(
            edge_artifact_name(Path::new("/tmp/images/dog.jpeg")),
            "bordes_dog.png"
        );
    }

    #[test]
    fn base_stops_at_first_dot() {
        assert_eq!(
            edge_artifact_name(Path::new("cat.small.v2.jpg")),
            "bordes_cat.png"
        );
    }

    #[test]
    fn no_extension() {
        assert_eq!(edge_artifact_name(Path::new("scan")), "bordes_scan.png");
    }

    #[test]
    fn saved_mask_round_trips() {
        let dir = std::env::temp_dir().join(format!("contourmap-artifact-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mask = EdgeMask::from_foreground(4, 3, &[(0, 2), (2, 1)]);

        let path = save_edges(&mask, Path::new("input/shape.png"), &dir).unwrap();
        assert_eq!(path, dir.join("bordes_shape.png"));

        let written = image::open(&path).unwrap().to_luma8();
        assert_eq!(written.dimensions(), (4, 3));
        assert_eq!(written.get_pixel(2, 0).0, [255]);
        assert_eq!(written.get_pixel(1, 2).0, [255]);
        assert_eq!(written.get_pixel(0, 0).0, [0]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
