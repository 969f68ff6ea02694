//! Spherical-earth geodesy.
//!
//! Every routine in this crate treats the earth as a sphere of radius
//! [`MEAN_EARTH_RADIUS`]. That is accurate to a fraction of a percent
//! over the ranges a person can sight a target, and keeps bearing,
//! destination and distance consistent with one another.

mod error;
mod kernel;
mod math;
mod point;

pub use crate::{
    error::GeodesyError,
    kernel::{
        bearing, destination, distance, intermediate, midpoint, normalize_bearing,
        normalize_longitude,
    },
    math::{elevation_angle, GreatCircle},
    point::{GeoPoint, COORD_EPSILON},
};
pub use geo;

/// Mean earth radius in meters.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_000.0;
