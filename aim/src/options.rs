use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand, ValueEnum};
use elevation::DEFAULT_ENDPOINT;
use geodesy::GeoPoint;
use std::str::FromStr;
use targeting::{DEFAULT_ELEVATION_THRESHOLD_M, DEFAULT_MAX_DISTANCE_M, DEFAULT_STEP_DISTANCE_M};

/// Project targets and search for terrain along a bearing.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// A "lat,lon" or "lat,lon,elev" argument, where 'elev' is meters
/// above sea level.
#[derive(Clone, Debug, Copy)]
pub struct LatLon(pub GeoPoint);

impl FromStr for LatLon {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let mut parts = s.split(',').map(str::trim);
        let (Some(lat_str), Some(lon_str)) = (parts.next(), parts.next()) else {
            return Err(anyhow!("not a valid lat,lon[,elev]"));
        };
        let elev_str = parts.next();
        if parts.next().is_some() {
            return Err(anyhow!("not a valid lat,lon[,elev]"));
        }
        let point = GeoPoint::new(f64::from_str(lat_str)?, f64::from_str(lon_str)?)?;
        Ok(match elev_str {
            Some(elev_str) => {
                let elev = f64::from_str(elev_str)?;
                if !elev.is_finite() {
                    return Err(anyhow!("elevation must be finite"));
                }
                Self(point.with_elevation(elev))
            }
            None => Self(point),
        })
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Distance and bearing between two points.
    Inverse {
        /// Start "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        start: LatLon,

        /// Destination "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        dest: LatLon,
    },

    /// The point a given distance along a bearing.
    Project {
        /// Start "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        start: LatLon,

        /// Degrees clockwise from north.
        #[arg(short, long, allow_hyphen_values = true)]
        bearing: f64,

        /// Meters.
        #[arg(short, long)]
        distance: f64,
    },

    /// Print the great circle path between two points.
    Path {
        /// Start "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        start: LatLon,

        /// Destination "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        dest: LatLon,

        /// Maximum path incremental step size, in meters.
        #[arg(short, long, default_value_t = 90.0)]
        max_step: f64,
    },

    /// Walk a bearing until the terrain departs from the start's
    /// elevation.
    Search {
        /// Start "lat,lon[,elev]". Elevation is looked up if omitted.
        #[arg(long, allow_hyphen_values = true)]
        start: LatLon,

        /// Degrees clockwise from north.
        #[arg(short, long, allow_hyphen_values = true)]
        bearing: f64,

        /// Farthest distance searched, in meters.
        #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE_M)]
        max_distance: f64,

        /// Distance between probes, in meters.
        #[arg(short, long, default_value_t = DEFAULT_STEP_DISTANCE_M)]
        step: f64,

        /// Elevation change that ends the search, in meters.
        #[arg(short, long, default_value_t = DEFAULT_ELEVATION_THRESHOLD_M)]
        threshold: f64,

        /// Give up after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Open-Elevation lookup URL.
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },
}
