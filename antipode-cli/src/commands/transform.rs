//! `point` and `viewport` commands - print the antipode of a location.

use antipode::coord::{antipode_of, antipode_of_viewport, Coordinate, Viewport};
use serde::Serialize;

use crate::error::CliError;

/// A transformed value alongside its input.
#[derive(Debug, Serialize)]
struct Report<T> {
    input: T,
    antipode: T,
}

/// Arguments for the viewport command.
pub struct ViewportArgs {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub json: bool,
}

/// Print the antipode of a single point.
pub fn run_point(lat: f64, lon: f64, json: bool) -> Result<(), CliError> {
    let input = Coordinate::new(lat, lon)?;
    let report = Report {
        input,
        antipode: antipode_of(input)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} -> {}", report.input, report.antipode);
        println!(
            "antipode: lat={} lon={}",
            report.antipode.lat(),
            report.antipode.lon()
        );
    }
    Ok(())
}

/// Print the antipodal viewport of a rectangle.
pub fn run_viewport(args: ViewportArgs) -> Result<(), CliError> {
    let input = Viewport::new(args.north, args.south, args.east, args.west)?;
    let report = Report {
        input,
        antipode: antipode_of_viewport(&input)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_viewport("input", &report.input);
        print_viewport("antipode", &report.antipode);
    }
    Ok(())
}

fn print_viewport(title: &str, viewport: &Viewport) {
    println!("{}:", title);
    println!("  north = {}", viewport.north());
    println!("  south = {}", viewport.south());
    println!("  east  = {}", viewport.east());
    println!("  west  = {}", viewport.west());
    if viewport.crosses_antimeridian() {
        println!("  (crosses the 180° meridian)");
    }
}
