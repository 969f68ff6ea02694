//! Elevation memoization.

use crate::{ElevationOracle, OracleError};
use async_trait::async_trait;
use dashmap::DashMap;
use geo::geometry::Coord;
use geodesy::GeoPoint;
use log::debug;

/// Cache grid spacing in degrees (about a meter at the equator).
const GRID_DEG: f64 = 1e-5;

/// Entry limit used by [CachedOracle::new].
pub const DEFAULT_MAX_ENTRIES: usize = 65_536;

/// Wraps an oracle and remembers every elevation it successfully
/// returns.
///
/// Points are snapped to a [GRID_DEG] grid, so lookups for points
/// within about a meter of each other share an entry. Failures are
/// never cached; the next lookup for that point asks the inner oracle
/// again.
///
/// The cache holds at most `max_entries` elevations. Inserting into a
/// full cache first empties it, so memory stays bounded however long
/// a session runs.
pub struct CachedOracle<O> {
    inner: O,

    /// Elevations which have been fetched, keyed by grid cell.
    elevations: DashMap<Coord<i32>, f64>,

    max_entries: usize,
}

impl<O> CachedOracle<O> {
    pub fn new(inner: O) -> Self {
        Self::with_max_entries(inner, DEFAULT_MAX_ENTRIES)
    }

    /// A `max_entries` of zero is treated as one.
    pub fn with_max_entries(inner: O, max_entries: usize) -> Self {
        Self {
            inner,
            elevations: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Returns the number of cached elevations.
    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    pub fn clear(&self) {
        self.elevations.clear();
    }
}

#[async_trait]
impl<O: ElevationOracle> ElevationOracle for CachedOracle<O> {
    async fn elevation(&self, point: &GeoPoint) -> Result<f64, OracleError> {
        let key = grid_cell(point);
        let cached = self.elevations.get(&key).map(|entry| *entry);
        if let Some(elevation) = cached {
            debug!("cache hit {point}: {elevation} m");
            return Ok(elevation);
        }
        let elevation = self.inner.elevation(point).await?;
        debug!("cache miss {point}: {elevation} m");
        if self.elevations.len() >= self.max_entries && !self.elevations.contains_key(&key) {
            debug!("cache full at {} entries, flushing", self.elevations.len());
            self.elevations.clear();
        }
        self.elevations.insert(key, elevation);
        Ok(elevation)
    }
}

/// Returns the grid cell containing `point`.
#[allow(clippy::cast_possible_truncation)]
fn grid_cell(point: &GeoPoint) -> Coord<i32> {
    Coord {
        x: (point.longitude() / GRID_DEG).round() as i32,
        y: (point.latitude() / GRID_DEG).round() as i32,
    }
}
