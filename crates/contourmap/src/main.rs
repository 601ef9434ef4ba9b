//! contourmap: compare an image's edge contours with their images under
//! complex-plane maps.
//!
//! Detects edges in the input image, lifts the edge pixels into the unit
//! disk of the complex plane, applies one named map (or a cascade of
//! them), and emits the result as a side-by-side SVG, a JSON payload for
//! external plotting, or a textual summary.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin contourmap -- [OPTIONS] <IMAGE_PATH>
//! contourmap photo.jpg --map Bilinear --param c=0.8 --svg out.svg
//! contourmap photo.jpg --map Cascade --cascade "Quadratic,Inverse" --json
//! contourmap --list-maps
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod artifact;

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser};
use contourmap_pipeline::diagnostics::{self, Clock};
use contourmap_pipeline::{
    CASCADE_TOKEN, MapRegistry, MapSelection, ParamOverride, PipelineConfig, PipelineError,
};
use tracing_subscriber::EnvFilter;

/// Edge contours under complex maps.
///
/// Extracts Canny edges from an image, normalizes them into the unit
/// disk, and applies a named complex map or a cascade of maps.
#[derive(Parser)]
#[command(name = "contourmap", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    #[arg(required_unless_present = "list_maps")]
    image_path: Option<PathBuf>,

    /// Map to apply, or "Cascade" to apply the maps listed in --cascade.
    #[arg(long, default_value = "Quadratic")]
    map: String,

    /// Comma-separated map names applied left to right, e.g.
    /// "Quadratic,Inverse". Used when --map is "Cascade".
    #[arg(long)]
    cascade: Option<String>,

    /// Parameter override `name=value` for a single map. Repeatable.
    #[arg(long = "param", value_name = "NAME=VALUE", action = ArgAction::Append)]
    params: Vec<ParamOverride>,

    /// Canny low threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, --map, --cascade, --param, and the Canny flags are
    /// ignored. The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write the edge mask as `bordes_<name>.png`.
    #[arg(long)]
    save_edges: bool,

    /// Directory for the edge-mask artifact.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write the side-by-side comparison SVG to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print the presenter payload as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Print per-stage timing and count diagnostics on stderr.
    #[arg(long)]
    diagnostics: bool,

    /// List the available maps and exit.
    #[arg(long)]
    list_maps: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, PipelineError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json)
            .map_err(|e| PipelineError::InvalidConfig(format!("--config-json: {e}")));
    }

    let selection = MapSelection::from_user(&cli.map, cli.cascade.as_deref())?;

    Ok(PipelineConfig {
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
        selection,
        overrides: cli.params.clone(),
    })
}

/// Render the map catalogue: name, formula, and defaults of the
/// parameters each formula reads.
fn map_catalogue(registry: &MapRegistry) -> String {
    let mut out = String::new();
    for entry in registry.entries() {
        let defaults = entry
            .kind
            .parameter_names()
            .iter()
            .filter_map(|&name| entry.defaults.get(name).map(|v| format!("{name}={v}")))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            "{:<12} {:<28} {defaults}",
            entry.kind.name(),
            entry.kind.formula(),
        );
    }
    let _ = write!(
        out,
        "{CASCADE_TOKEN:<12} apply --cascade \"A,B,...\" left to right"
    );
    out
}

/// Report a failure on stderr and, with `--json`, as a JSON document on
/// stdout.
fn report_failure(err: &PipelineError, json: bool) -> ExitCode {
    eprintln!("Error: {err}");
    if json {
        match contourmap_export::error_to_json(err) {
            Ok(doc) => println!("{doc}"),
            Err(e) => eprintln!("Error serializing error report: {e}"),
        }
    }
    ExitCode::FAILURE
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_maps {
        println!("{}", map_catalogue(MapRegistry::builtin()));
        return ExitCode::SUCCESS;
    }

    let Some(image_path) = cli.image_path.as_deref() else {
        eprintln!("Error: an image path is required");
        return ExitCode::FAILURE;
    };

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(e) => return report_failure(&e, cli.json),
    };

    let image_bytes = match std::fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes)",
        image_path.display(),
        image_bytes.len(),
    );

    let (result, diag) =
        match diagnostics::process_with_diagnostics(&image_bytes, &config, &StdClock) {
            Ok(pair) => pair,
            Err(e) => return report_failure(&e, cli.json),
        };

    if cli.diagnostics {
        eprintln!("{}", diag.report());
    }

    if cli.save_edges {
        match artifact::save_edges(&result.edges, image_path, &cli.out_dir) {
            Ok(path) => eprintln!("Edge mask written to {}", path.display()),
            Err(e) => {
                eprintln!("Error writing edge mask: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(ref svg_path) = cli.svg {
        let title = image_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("contourmap");
        let desc = format!("{config:?}");
        let metadata = contourmap_export::SvgMetadata {
            title: Some(title),
            description: Some(&desc),
        };
        let svg = contourmap_export::to_comparison_svg(&result.original, &result.mapped, &metadata);
        if let Err(e) = std::fs::write(svg_path, &svg) {
            eprintln!("Error writing SVG to {}: {e}", svg_path.display());
            return ExitCode::FAILURE;
        }
        eprintln!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
    }

    if cli.json {
        match contourmap_export::to_json(&result.original, &result.mapped, result.dimensions) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing result: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!(
            "{}: {} points from a {}x{} image",
            result.mapped.title,
            result.mapped.points.len(),
            result.dimensions.width,
            result.dimensions.height,
        );
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("contourmap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_select_quadratic() {
        let config = config_from_cli(&parse(&["img.png"])).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn repeated_params_are_collected() {
        let cli = parse(&["img.png", "--map", "Bilinear", "--param", "c=0.8", "--param", "d=2"]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(
            config.selection,
            MapSelection::Single {
                name: "Bilinear".to_string()
            }
        );
        assert_eq!(
            config.overrides,
            vec![ParamOverride::new("c", 0.8), ParamOverride::new("d", 2.0)]
        );
    }

    #[test]
    fn malformed_param_is_rejected_by_parser() {
        let parsed = Cli::try_parse_from(["contourmap", "img.png", "--param", "c"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cascade_selection() {
        let cli = parse(&["img.png", "--map", "Cascade", "--cascade", "Quadratic,Inverse"]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(
            config.selection,
            MapSelection::Cascade {
                names: "Quadratic,Inverse".to_string()
            }
        );
    }

    #[test]
    fn cascade_without_list_is_an_error() {
        let cli = parse(&["img.png", "--map", "Cascade"]);
        assert!(matches!(
            config_from_cli(&cli),
            Err(PipelineError::MissingCascade)
        ));
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&[
            "img.png",
            "--map",
            "Linear",
            "--config-json",
            r#"{"canny_low": 50.0, "selection": {"Single": {"name": "Inverse"}}}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.canny_low - 50.0).abs() < f32::EPSILON);
        assert!((config.canny_high - PipelineConfig::DEFAULT_CANNY_HIGH).abs() < f32::EPSILON);
        assert_eq!(
            config.selection,
            MapSelection::Single {
                name: "Inverse".to_string()
            }
        );
    }

    #[test]
    fn bad_config_json() {
        let cli = parse(&["img.png", "--config-json", "{not json"]);
        let err = config_from_cli(&cli).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(ref msg) if msg.starts_with("--config-json")));
    }

    #[test]
    fn list_maps_needs_no_image() {
        let cli = parse(&["--list-maps"]);
        assert!(cli.list_maps);
        assert!(cli.image_path.is_none());
        assert!(Cli::try_parse_from(["contourmap"]).is_err());
    }

    #[test]
    fn catalogue_lists_every_map_with_defaults() {
        let listing = map_catalogue(MapRegistry::builtin());
        for name in MapRegistry::builtin().names() {
            assert!(listing.contains(name), "{name} missing");
        }
        assert!(listing.contains("a=1.5"));
        assert!(listing.contains("c=0 d=1"));
        assert!(listing.contains(CASCADE_TOKEN));
    }
}
