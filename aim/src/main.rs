mod options;

use anyhow::{anyhow, Error as AnyError};
use clap::Parser;
use elevation::{CachedOracle, OpenElevation, DEFAULT_TIMEOUT};
use geodesy::{bearing, destination, distance, midpoint, GeoPoint, GreatCircle};
use log::info;
use options::{Cli, Command as CliCmd, Format, LatLon};
use serde::Serialize;
use std::{io::Write, time::Duration};
use targeting::{
    distance_label, HeadingSample, OrientationMode, ProfileSample, Resolution, SearchConfig,
    SearchOutcome, Session,
};

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    let Cli { format, cmd } = Cli::parse();

    env_logger::init();

    match cmd {
        CliCmd::Inverse {
            start: LatLon(start),
            dest: LatLon(dest),
        } => print_inverse(format, &start, &dest)?,
        CliCmd::Project {
            start: LatLon(start),
            bearing,
            distance,
        } => print_point(format, &destination(&start, bearing, distance))?,
        CliCmd::Path {
            start: LatLon(start),
            dest: LatLon(dest),
            max_step,
        } => {
            let path = GreatCircle::new(&start, max_step, &dest);
            match format {
                Format::Text => print_csv(path)?,
                Format::Json => print_json(path)?,
            }
        }
        CliCmd::Search {
            start: LatLon(start),
            bearing,
            max_distance,
            step,
            threshold,
            timeout_ms,
            endpoint,
        } => {
            let mut config = SearchConfig::new(max_distance, step, threshold)?;
            if let Some(timeout_ms) = timeout_ms {
                config = config.with_time_budget(Duration::from_millis(timeout_ms));
            }
            let oracle = CachedOracle::new(OpenElevation::with_endpoint(endpoint, DEFAULT_TIMEOUT)?);
            let mut session = Session::new(oracle, OrientationMode::ElevationSearch(config));
            let origin = session.pick_origin(start).await;
            info!("searching from {origin}");
            let sample =
                HeadingSample::now(bearing).ok_or_else(|| anyhow!("bearing must be finite"))?;
            let outcome = session
                .on_heading(&sample)
                .await?
                .ok_or_else(|| anyhow!("search did not run"))?;
            print_search(format, &outcome)?;
        }
    }
    Ok(())
}

fn print_inverse(format: Format, start: &GeoPoint, dest: &GeoPoint) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonInverse {
        distance_m: f64,
        bearing_deg: f64,
        label: String,
        midpoint: GeoPoint,
    }

    let distance_m = distance(start, dest);
    let inverse = JsonInverse {
        distance_m,
        bearing_deg: bearing(start, dest),
        label: distance_label(distance_m),
        midpoint: midpoint(start, dest),
    };
    match format {
        Format::Text => {
            println!("distance: {}", inverse.label);
            println!("bearing:  {:.2}°", inverse.bearing_deg);
            println!("midpoint: {}", inverse.midpoint);
        }
        Format::Json => println!("{}", serde_json::to_string(&inverse)?),
    }
    Ok(())
}

fn print_point(format: Format, point: &GeoPoint) -> Result<(), AnyError> {
    match format {
        Format::Text => println!("{point}"),
        Format::Json => println!("{}", serde_json::to_string(point)?),
    }
    Ok(())
}

/// # Example with gnuplot
///
/// ```sh
/// cargo run --bin aim -- path --start=51.5007,-0.1246 --dest=48.8584,2.2945 | tr ',' ' ' > ~/.tmp/path && gnuplot -p -e "plot '~/.tmp/path' using 3:2 with lines"
/// ```
#[allow(clippy::cast_precision_loss)]
fn print_csv(path: GreatCircle) -> Result<(), AnyError> {
    let step_size_m = path.step_size_m();
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Distance,Latitude,Longitude")?;
    for (idx, point) in path.enumerate() {
        let distance = idx as f64 * step_size_m;
        let latitude = point.latitude();
        let longitude = point.longitude();
        writeln!(stdout, "{distance},{latitude},{longitude}")?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn print_json(path: GreatCircle) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonEntry {
        distance_m: f64,
        location: [f64; 2],
    }

    let step_size_m = path.step_size_m();
    let reshaped: Vec<JsonEntry> = path
        .enumerate()
        .map(|(idx, point)| JsonEntry {
            distance_m: idx as f64 * step_size_m,
            location: [point.latitude(), point.longitude()],
        })
        .collect();
    let json = serde_json::to_string(&reshaped)?;
    println!("{json}");
    Ok(())
}

fn print_search(format: Format, outcome: &SearchOutcome) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonSearch<'a> {
        resolution: Resolution,
        target: GeoPoint,
        distance_m: f64,
        samples: &'a [ProfileSample],
        failed_distances_m: &'a [f64],
        last_error: Option<String>,
    }

    match format {
        Format::Text => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "Distance,Latitude,Longitude,Elevation")?;
            for sample in &outcome.samples {
                let elevation = sample
                    .elevation_m
                    .map(|elev| elev.to_string())
                    .unwrap_or_default();
                writeln!(
                    stdout,
                    "{},{},{},{elevation}",
                    sample.distance_m,
                    sample.point.latitude(),
                    sample.point.longitude()
                )?;
            }
            if let Some(failure) = &outcome.partial_failure {
                eprintln!(
                    "{} lookups failed, last: {}",
                    failure.failed_distances_m.len(),
                    failure.last_error
                );
            }
            eprintln!(
                "{:?}: {} at {}",
                outcome.resolution,
                outcome.target,
                distance_label(outcome.distance_m)
            );
        }
        Format::Json => {
            let search = JsonSearch {
                resolution: outcome.resolution,
                target: outcome.target,
                distance_m: outcome.distance_m,
                samples: &outcome.samples,
                failed_distances_m: outcome
                    .partial_failure
                    .as_ref()
                    .map_or(Default::default(), |failure| failure.failed_distances_m.as_slice()),
                last_error: outcome
                    .partial_failure
                    .as_ref()
                    .map(|failure| failure.last_error.to_string()),
            };
            println!("{}", serde_json::to_string(&search)?);
        }
    }
    Ok(())
}
