//! Scripted elevation oracle for tests.

use async_trait::async_trait;
use elevation::{ElevationOracle, OracleError};
use geodesy::{distance, GeoPoint};
use std::{sync::Mutex, time::Duration};

type Script = Box<dyn Fn(f64) -> Result<f64, OracleError> + Send + Sync>;

/// Answers each lookup by the queried point's distance (rounded to
/// the nearest meter) from an anchor point, and records the order of
/// lookups.
pub(crate) struct ScriptedOracle {
    anchor: GeoPoint,
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<Vec<f64>>,
}

impl ScriptedOracle {
    pub(crate) fn new<F>(anchor: GeoPoint, script: F) -> Self
    where
        F: Fn(f64) -> Result<f64, OracleError> + Send + Sync + 'static,
    {
        Self {
            anchor,
            script: Box::new(script),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every lookup sleeps for `delay` before answering.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Distances looked up so far, in call order.
    pub(crate) fn calls(&self) -> Vec<f64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ElevationOracle for ScriptedOracle {
    async fn elevation(&self, point: &GeoPoint) -> Result<f64, OracleError> {
        let distance_m = distance(&self.anchor, point).round();
        self.calls.lock().unwrap().push(distance_m);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.script)(distance_m)
    }
}
