//! Stepped elevation search.
//!
//! Walks outward from an origin along a bearing, one probe at a time,
//! and stops at the first probe whose ground elevation differs from
//! the origin's by more than the configured threshold.
//!
//! Probes are strictly sequential: probe `n + 1` is not issued until
//! probe `n` has resolved, so a far probe can never pre-empt a nearer
//! one.

use crate::{SearchConfig, TargetingError};
use elevation::{ElevationOracle, OracleError};
use geodesy::{destination, GeoPoint};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::time::{timeout_at, Instant};

/// How a search concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    /// A probe met the elevation threshold.
    Found,

    /// No probe qualified out to the max distance.
    Exhausted,

    /// The time budget ran out before the search finished.
    TimedOut,
}

/// One probe along the search bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileSample {
    /// Distance from the origin (meters).
    pub distance_m: f64,

    pub point: GeoPoint,

    /// Ground elevation, if the oracle answered.
    pub elevation_m: Option<f64>,
}

/// Oracle failures encountered by a search that still produced a
/// target.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSearchFailure {
    /// Distances of the probes whose lookup failed.
    pub failed_distances_m: Vec<f64>,

    /// The most recent failure.
    pub last_error: OracleError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// The first qualifying probe, or the max distance fallback.
    pub target: GeoPoint,

    /// Distance from the origin to `target` (meters).
    pub distance_m: f64,

    pub resolution: Resolution,

    /// Every probe evaluated, nearest first.
    pub samples: Vec<ProfileSample>,

    /// Set when at least one probe's lookup failed.
    pub partial_failure: Option<PartialSearchFailure>,
}

/// Finds targets by querying an [ElevationOracle] along a bearing.
///
/// The engine holds no location state; everything about a search is
/// passed in and returned.
pub struct TargetSearchEngine<O> {
    oracle: O,
}

impl<O> TargetSearchEngine<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<O: ElevationOracle> TargetSearchEngine<O> {
    /// Searches outward from `origin` along `bearing_deg`.
    ///
    /// Fails only if `origin` has no elevation or `config` is invalid;
    /// oracle failures are skipped and summarized in the outcome.
    pub async fn search(
        &self,
        origin: &GeoPoint,
        bearing_deg: f64,
        config: &SearchConfig,
    ) -> Result<SearchOutcome, TargetingError> {
        config.validate()?;
        let origin_elev_m = origin
            .elevation()
            .filter(|elev| elev.is_finite())
            .ok_or(TargetingError::MissingElevation)?;
        // A budget too large to represent never expires.
        let deadline = config
            .time_budget
            .and_then(|budget| Instant::now().checked_add(budget));

        let mut samples = Vec::new();
        let mut failed_distances_m = Vec::new();
        let mut last_error = None;
        let mut found = None;
        let mut resolution = Resolution::Exhausted;

        for distance_m in config.step_distances() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                resolution = Resolution::TimedOut;
                break;
            }

            let candidate = destination(origin, bearing_deg, distance_m);
            let lookup = match deadline {
                Some(deadline) => match timeout_at(deadline, self.oracle.elevation(&candidate)).await {
                    Ok(lookup) => lookup,
                    Err(_elapsed) => {
                        resolution = Resolution::TimedOut;
                        break;
                    }
                },
                None => self.oracle.elevation(&candidate).await,
            };

            match lookup {
                Ok(elevation_m) => {
                    debug!("probe {distance_m} m: {elevation_m} m");
                    samples.push(ProfileSample {
                        distance_m,
                        point: candidate,
                        elevation_m: Some(elevation_m),
                    });
                    if (elevation_m - origin_elev_m).abs() > config.elevation_threshold_m {
                        found = Some((candidate.with_elevation(elevation_m), distance_m));
                        resolution = Resolution::Found;
                        break;
                    }
                }
                Err(err) => {
                    debug!("probe {distance_m} m: {err}");
                    samples.push(ProfileSample {
                        distance_m,
                        point: candidate,
                        elevation_m: None,
                    });
                    failed_distances_m.push(distance_m);
                    last_error = Some(err);
                }
            }
        }

        let (target, distance_m) = match found {
            Some(hit) => hit,
            None => {
                let fallback = destination(origin, bearing_deg, config.max_distance_m);
                let fallback = match samples.last() {
                    Some(ProfileSample {
                        distance_m,
                        elevation_m: Some(elevation_m),
                        ..
                    }) if *distance_m == config.max_distance_m => fallback.with_elevation(*elevation_m),
                    _ => fallback,
                };
                (fallback, config.max_distance_m)
            }
        };

        let partial_failure = last_error.map(|last_error| PartialSearchFailure {
            failed_distances_m,
            last_error,
        });
        if let Some(failure) = &partial_failure {
            warn!(
                "search from {origin} at {bearing_deg}°: {} of {} probes failed, last: {}",
                failure.failed_distances_m.len(),
                samples.len(),
                failure.last_error
            );
        }
        info!(
            "search from {origin} at {bearing_deg}°: {resolution:?}, target {target} at {distance_m} m"
        );

        Ok(SearchOutcome {
            target,
            distance_m,
            resolution,
            samples,
            partial_failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Resolution, TargetSearchEngine};
    use crate::{test_oracle::ScriptedOracle, SearchConfig, TargetingError};
    use approx::assert_relative_eq;
    use elevation::OracleError;
    use geodesy::{destination, distance, GeoPoint};
    use std::time::Duration;

    fn origin() -> GeoPoint {
        GeoPoint::new(44.2705, -71.30325).unwrap().with_elevation(100.0)
    }

    fn config() -> SearchConfig {
        SearchConfig::new(500.0, 50.0, 50.0).unwrap()
    }

    #[tokio::test]
    async fn test_returns_first_qualifying_probe() {
        let oracle = ScriptedOracle::new(origin(), |d| Ok(if d == 300.0 { 200.0 } else { 100.0 }));
        let engine = TargetSearchEngine::new(oracle);
        let outcome = engine.search(&origin(), 72.0, &config()).await.unwrap();

        assert_eq!(outcome.resolution, Resolution::Found);
        assert_eq!(outcome.distance_m, 300.0);
        assert_eq!(outcome.target, destination(&origin(), 72.0, 300.0));
        assert_eq!(outcome.target.elevation(), Some(200.0));
        assert_relative_eq!(distance(&origin(), &outcome.target), 300.0, max_relative = 1e-9);
        assert!(outcome.partial_failure.is_none());
        assert_eq!(
            engine.oracle().calls(),
            vec![50.0, 100.0, 150.0, 200.0, 250.0, 300.0]
        );
        assert_eq!(outcome.samples.len(), 6);
    }

    #[tokio::test]
    async fn test_first_match_not_best_match() {
        let oracle = ScriptedOracle::new(origin(), |d| match d as u32 {
            150 => Ok(160.0),
            200 => Ok(900.0),
            _ => Ok(100.0),
        });
        let engine = TargetSearchEngine::new(oracle);
        let outcome = engine.search(&origin(), 0.0, &config()).await.unwrap();
        assert_eq!(outcome.distance_m, 150.0);
        assert_eq!(outcome.target.elevation(), Some(160.0));
    }

    #[tokio::test]
    async fn test_threshold_is_strict_and_symmetric() {
        // Exactly at the threshold does not qualify; a drop does.
        let oracle = ScriptedOracle::new(origin(), |d| match d as u32 {
            100 => Ok(150.0),
            200 => Ok(49.0),
            _ => Ok(100.0),
        });
        let engine = TargetSearchEngine::new(oracle);
        let outcome = engine.search(&origin(), 180.0, &config()).await.unwrap();
        assert_eq!(outcome.resolution, Resolution::Found);
        assert_eq!(outcome.distance_m, 200.0);
    }

    #[tokio::test]
    async fn test_every_probe_failing_falls_back() {
        let oracle = ScriptedOracle::new(origin(), |_| Err(OracleError::Network("offline".into())));
        let engine = TargetSearchEngine::new(oracle);
        let outcome = engine.search(&origin(), 45.0, &config()).await.unwrap();

        assert_eq!(outcome.resolution, Resolution::Exhausted);
        assert_eq!(outcome.distance_m, 500.0);
        assert_eq!(outcome.target, destination(&origin(), 45.0, 500.0));
        assert_eq!(outcome.target.elevation(), None);
        assert_eq!(engine.oracle().calls().len(), 10);

        let failure = outcome.partial_failure.expect("one failure report");
        assert_eq!(failure.failed_distances_m.len(), 10);
        assert_eq!(failure.last_error, OracleError::Network("offline".into()));
        assert!(outcome.samples.iter().all(|s| s.elevation_m.is_none()));
    }

    #[tokio::test]
    async fn test_failed_probe_is_skipped_not_matched() {
        let oracle = ScriptedOracle::new(origin(), |d| match d as u32 {
            100 => Err(OracleError::NoData),
            150 => Ok(40.0),
            _ => Ok(100.0),
        });
        let engine = TargetSearchEngine::new(oracle);
        let outcome = engine.search(&origin(), 270.0, &config()).await.unwrap();

        assert_eq!(outcome.resolution, Resolution::Found);
        assert_eq!(outcome.distance_m, 150.0);
        assert_eq!(engine.oracle().calls(), vec![50.0, 100.0, 150.0]);
        let failure = outcome.partial_failure.unwrap();
        assert_eq!(failure.failed_distances_m, vec![100.0]);
        assert_eq!(failure.last_error, OracleError::NoData);
    }

    #[tokio::test]
    async fn test_exhausted_keeps_last_elevation() {
        let oracle = ScriptedOracle::new(origin(), |_| Ok(120.0));
        let engine = TargetSearchEngine::new(oracle);
        let outcome = engine.search(&origin(), 10.0, &config()).await.unwrap();
        assert_eq!(outcome.resolution, Resolution::Exhausted);
        assert_eq!(outcome.target.elevation(), Some(120.0));
        assert!(outcome.partial_failure.is_none());
        let distances: Vec<f64> = outcome.samples.iter().map(|s| s.distance_m).collect();
        assert!(distances.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn test_uneven_max_distance() {
        let oracle = ScriptedOracle::new(origin(), |_| Ok(100.0));
        let engine = TargetSearchEngine::new(oracle);
        let config = SearchConfig::new(120.0, 50.0, 50.0).unwrap();
        let outcome = engine.search(&origin(), 10.0, &config).await.unwrap();
        assert_eq!(engine.oracle().calls(), vec![50.0, 100.0]);
        assert_eq!(outcome.distance_m, 120.0);
        assert_eq!(outcome.target, destination(&origin(), 10.0, 120.0));
        assert_eq!(outcome.target.elevation(), None);
    }

    #[tokio::test]
    async fn test_missing_origin_elevation() {
        let oracle = ScriptedOracle::new(origin(), |_| Ok(100.0));
        let engine = TargetSearchEngine::new(oracle);
        let result = engine
            .search(&origin().without_elevation(), 10.0, &config())
            .await;
        assert_eq!(result, Err(TargetingError::MissingElevation));
        assert!(engine.oracle().calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let oracle = ScriptedOracle::new(origin(), |_| Ok(100.0));
        let engine = TargetSearchEngine::new(oracle);
        let config = SearchConfig {
            step_distance_m: 0.0,
            ..SearchConfig::default()
        };
        let result = engine.search(&origin(), 10.0, &config).await;
        assert!(matches!(result, Err(TargetingError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_non_finite_origin_elevation() {
        let oracle = ScriptedOracle::new(origin(), |_| Ok(100.0));
        let engine = TargetSearchEngine::new(oracle);
        for elev in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = engine
                .search(&origin().with_elevation(elev), 10.0, &config())
                .await;
            assert_eq!(result, Err(TargetingError::MissingElevation), "{elev}");
        }
        assert!(engine.oracle().calls().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_step_count_rejected() {
        let oracle = ScriptedOracle::new(origin(), |_| Ok(100.0));
        let engine = TargetSearchEngine::new(oracle);
        let config = SearchConfig {
            max_distance_m: 1e18,
            step_distance_m: 1.0,
            ..SearchConfig::default()
        };
        let result = engine.search(&origin(), 10.0, &config).await;
        assert!(matches!(result, Err(TargetingError::InvalidConfig(_))));
        assert!(engine.oracle().calls().is_empty());
    }

    #[tokio::test]
    async fn test_unrepresentable_time_budget_never_expires() {
        let oracle = ScriptedOracle::new(origin(), |d| Ok(if d == 150.0 { 0.0 } else { 100.0 }));
        let engine = TargetSearchEngine::new(oracle);
        let config = config().with_time_budget(Duration::MAX);
        let outcome = engine.search(&origin(), 10.0, &config).await.unwrap();
        assert_eq!(outcome.resolution, Resolution::Found);
        assert_eq!(outcome.distance_m, 150.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_budget_falls_back() {
        let oracle =
            ScriptedOracle::new(origin(), |_| Ok(100.0)).with_delay(Duration::from_secs(1));
        let engine = TargetSearchEngine::new(oracle);
        let config = config().with_time_budget(Duration::from_millis(3_500));
        let outcome = engine.search(&origin(), 10.0, &config).await.unwrap();

        assert_eq!(outcome.resolution, Resolution::TimedOut);
        assert_eq!(outcome.distance_m, 500.0);
        assert_eq!(outcome.target, destination(&origin(), 10.0, 500.0));
        assert_eq!(outcome.samples.len(), 3);
        // The fourth probe was issued but abandoned.
        assert_eq!(engine.oracle().calls().len(), 4);
        assert!(outcome.partial_failure.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_generous_time_budget_is_invisible() {
        let oracle = ScriptedOracle::new(origin(), |d| Ok(if d == 250.0 { 0.0 } else { 100.0 }))
            .with_delay(Duration::from_millis(100));
        let engine = TargetSearchEngine::new(oracle);
        let config = config().with_time_budget(Duration::from_secs(60));
        let outcome = engine.search(&origin(), 10.0, &config).await.unwrap();
        assert_eq!(outcome.resolution, Resolution::Found);
        assert_eq!(outcome.distance_m, 250.0);
    }
}
