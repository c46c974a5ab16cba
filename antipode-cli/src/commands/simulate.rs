//! Simulate command - drive two headless viewers through a short session.
//!
//! Boots the application over two [`HeadlessViewer`]s, then pans viewer A,
//! switches viewer B's imagery style and runs a search on B, printing both
//! viewers after each step. The fit counts show that each user action moves
//! the other viewer exactly once and never echoes back.

use std::path::PathBuf;
use std::sync::Arc;

use antipode::app::{AntipodeApp, AppConfig};
use antipode::coord::{Coordinate, Viewport};
use antipode::selection::PlaceResult;
use antipode::viewer::{HeadlessViewer, ImageryStyle, MapViewer, ViewerSide};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Place searched on viewer B when no results file is given (Madrid).
const DEFAULT_SEARCH: (f64, f64, &str) = (40.416775, -3.70379, "Madrid");

/// Arguments for the simulate command.
pub struct SimulateArgs {
    pub zoom: Option<u8>,
    pub style: Option<ImageryStyle>,
    pub pan_lat: f64,
    pub pan_lon: f64,
    pub switch_to: ImageryStyle,
    pub results: Option<PathBuf>,
}

/// Run the simulate command.
pub fn run(runner: &CliRunner, args: SimulateArgs) -> Result<(), CliError> {
    runner.log_startup("simulate");

    let mut config = AppConfig::from_config_file(runner.config())?;
    if let Some(zoom) = args.zoom {
        config = config.with_zoom(zoom);
    }
    if let Some(style) = args.style {
        config = config.with_style(style);
    }
    let results = load_results(args.results.as_ref())?;

    let a = Arc::new(HeadlessViewer::new("A", config.zoom));
    let b = Arc::new(HeadlessViewer::new("B", config.zoom));
    let app = AntipodeApp::start(config, a.clone(), b.clone())?;
    a.clear_calls();
    b.clear_calls();

    print_step("Startup", &a, &b);

    a.drag_by(args.pan_lat, args.pan_lon);
    print_step(
        &format!("Pan A by ({}, {})", args.pan_lat, args.pan_lon),
        &a,
        &b,
    );

    b.set_imagery_style(args.switch_to);
    print_step(&format!("Switch B to {}", args.switch_to), &a, &b);

    let outcome = app.select(ViewerSide::B, &results);
    print_step(&format!("Search on B ({:?})", outcome), &a, &b);

    Ok(())
}

fn load_results(path: Option<&PathBuf>) -> Result<Vec<PlaceResult>, CliError> {
    match path {
        Some(path) => {
            let data = std::fs::read_to_string(path).map_err(|e| {
                CliError::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&data).map_err(|e| {
                CliError::Config(format!("Invalid results file {}: {}", path.display(), e))
            })
        }
        None => {
            let (lat, lon, label) = DEFAULT_SEARCH;
            Ok(vec![PlaceResult::at(Coordinate::new(lat, lon)?).with_label(label)])
        }
    }
}

fn print_step(title: &str, a: &HeadlessViewer, b: &HeadlessViewer) {
    println!("== {} ==", title);
    print_viewer(a);
    print_viewer(b);
    println!();
}

fn print_viewer(viewer: &HeadlessViewer) {
    let style = viewer
        .imagery_style()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {}: {}  style={}  fits={}  calls={}",
        viewer.name(),
        describe(viewer.viewport()),
        style,
        viewer.fit_count(),
        viewer.calls().len()
    );
    for marker in viewer.markers() {
        let label = marker
            .label
            .as_deref()
            .map(|l| format!(" ({})", l))
            .unwrap_or_default();
        println!(
            "     marker #{} at {}{}",
            marker.handle.id(),
            marker.position,
            label
        );
    }
}

fn describe(viewport: Option<Viewport>) -> String {
    match viewport {
        Some(v) => format!("center {} [{}]", v.center(), v),
        None => "(no viewport)".to_string(),
    }
}
