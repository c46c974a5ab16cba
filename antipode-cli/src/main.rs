//! Antipode CLI - Command-line interface
//!
//! Computes antipodes of points and viewports, runs a headless two-viewer
//! simulation, and manages the configuration file.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use antipode::config::config_file_path;
use antipode::viewer::ImageryStyle;
use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::simulate::SimulateArgs;
use commands::transform::ViewportArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "antipode")]
#[command(version, about = "Two linked map views of opposite points on Earth", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long = "config", global = true)]
    config_file: Option<PathBuf>,

    /// Log filter, overriding the configured level (e.g. debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the antipode of a point
    Point {
        /// Latitude in degrees (-90 to 90)
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees (-180 to 180)
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the antipodal viewport of a rectangle
    Viewport {
        #[arg(long, allow_negative_numbers = true)]
        north: f64,

        #[arg(long, allow_negative_numbers = true)]
        south: f64,

        #[arg(long, allow_negative_numbers = true)]
        east: f64,

        #[arg(long, allow_negative_numbers = true)]
        west: f64,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Run two headless viewers through a pan, a style switch and a search
    Simulate {
        /// Zoom level for both viewers (overrides config)
        #[arg(long)]
        zoom: Option<u8>,

        /// Initial imagery style (overrides config)
        #[arg(long)]
        style: Option<ImageryStyle>,

        /// Latitude delta of the pan on viewer A
        #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
        pan_lat: f64,

        /// Longitude delta of the pan on viewer A
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        pan_lon: f64,

        /// Style viewer B switches to
        #[arg(long, default_value = "satellite")]
        switch_to: ImageryStyle,

        /// JSON file with the search results to select on viewer B
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// View and modify configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Point { lat, lon, json } => commands::transform::run_point(lat, lon, json),
        Commands::Viewport {
            north,
            south,
            east,
            west,
            json,
        } => commands::transform::run_viewport(ViewportArgs {
            north,
            south,
            east,
            west,
            json,
        }),
        Commands::Simulate {
            zoom,
            style,
            pan_lat,
            pan_lon,
            switch_to,
            results,
        } => {
            let runner = CliRunner::new(cli.config_file.as_deref(), cli.log_level.as_deref())?;
            commands::simulate::run(
                &runner,
                SimulateArgs {
                    zoom,
                    style,
                    pan_lat,
                    pan_lon,
                    switch_to,
                    results,
                },
            )
        }
        Commands::Config(command) => {
            let path = cli.config_file.unwrap_or_else(config_file_path);
            commands::config::run(command, &path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let cli = Cli::try_parse_from(["antipode", "point", "-33.4", "-70.6"]).unwrap();
        match cli.command {
            Commands::Point { lat, lon, json } => {
                assert_eq!(lat, -33.4);
                assert_eq!(lon, -70.6);
                assert!(!json);
            }
            _ => panic!("expected point command"),
        }
    }

    #[test]
    fn test_simulate_style_parse() {
        let cli =
            Cli::try_parse_from(["antipode", "simulate", "--switch-to", "hybrid"]).unwrap();
        match cli.command {
            Commands::Simulate { switch_to, .. } => assert_eq!(switch_to, ImageryStyle::Hybrid),
            _ => panic!("expected simulate command"),
        }
    }
}
