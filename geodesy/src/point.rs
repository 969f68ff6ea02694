use crate::{normalize_longitude, GeodesyError};
use geo::geometry::{Coord, Point};
use serde::Serialize;
use std::fmt;

/// Coordinates closer than this many degrees compare equal.
pub const COORD_EPSILON: f64 = 1e-9;

/// A validated position on the earth's surface, with an optional
/// ground elevation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeoPoint {
    /// Degrees north, in [-90, 90].
    latitude: f64,

    /// Degrees east, in [-180, 180].
    longitude: f64,

    /// Meters above sea level, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    elevation: Option<f64>,
}

impl GeoPoint {
    /// Returns a new point, or an error if either coordinate is out of
    /// range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeodesyError> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Ok(Self {
                latitude,
                longitude,
                elevation: None,
            })
        } else {
            Err(GeodesyError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Builds a point from the output of trig routines.
    ///
    /// Latitude is clamped and longitude wrapped so that round-off
    /// never produces an out of range point.
    pub(crate) fn from_radians(lat: f64, lon: f64) -> Self {
        Self {
            latitude: lat.to_degrees().clamp(-90.0, 90.0),
            longitude: normalize_longitude(lon.to_degrees()),
            elevation: None,
        }
    }

    #[must_use]
    pub fn with_elevation(mut self, meters: f64) -> Self {
        self.elevation = Some(meters);
        self
    }

    #[must_use]
    pub fn without_elevation(mut self) -> Self {
        self.elevation = None;
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    /// Returns (latitude, longitude) in radians.
    pub(crate) fn radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

/// Coordinate equality within [`COORD_EPSILON`]; elevation is ignored.
impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        (self.latitude - other.latitude).abs() <= COORD_EPSILON
            && normalize_longitude(self.longitude - other.longitude).abs() <= COORD_EPSILON
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)?;
        if let Some(elevation) = self.elevation {
            write!(f, " ({elevation:.1} m)")?;
        }
        Ok(())
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Coord {
            x: point.longitude,
            y: point.latitude,
        }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Point::from(Coord::from(point))
    }
}

impl TryFrom<Coord<f64>> for GeoPoint {
    type Error = GeodesyError;

    fn try_from(Coord { x, y }: Coord<f64>) -> Result<Self, GeodesyError> {
        Self::new(y, x)
    }
}

impl TryFrom<Point<f64>> for GeoPoint {
    type Error = GeodesyError;

    fn try_from(point: Point<f64>) -> Result<Self, GeodesyError> {
        Self::try_from(point.0)
    }
}
