//! Ground elevation lookups.
//!
//! [ElevationOracle] is the seam between the targeting engine and
//! wherever elevations come from. [OpenElevation] queries the public
//! Open-Elevation HTTP API, and [CachedOracle] memoizes any other
//! oracle.

mod cache;
mod error;
mod open_elevation;

pub use crate::{
    cache::{CachedOracle, DEFAULT_MAX_ENTRIES},
    error::OracleError,
    open_elevation::{OpenElevation, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT},
};
use async_trait::async_trait;
use geodesy::GeoPoint;
use std::sync::Arc;

/// A source of ground elevation.
///
/// Lookups are independent of one another; an implementation may
/// retry internally, callers never do.
#[async_trait]
pub trait ElevationOracle: Send + Sync {
    /// Returns the ground elevation at `point` in meters above sea
    /// level.
    async fn elevation(&self, point: &GeoPoint) -> Result<f64, OracleError>;
}

#[async_trait]
impl<T: ElevationOracle + ?Sized> ElevationOracle for Arc<T> {
    async fn elevation(&self, point: &GeoPoint) -> Result<f64, OracleError> {
        (**self).elevation(point).await
    }
}

#[async_trait]
impl<'a, T: ElevationOracle + ?Sized> ElevationOracle for &'a T {
    async fn elevation(&self, point: &GeoPoint) -> Result<f64, OracleError> {
        (**self).elevation(point).await
    }
}
