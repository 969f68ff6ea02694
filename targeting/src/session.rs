use crate::{
    HeadingSample, LocationState, OrientationMode, OrientationSync, OrientationUpdate,
    RotationCommand, SearchOutcome, TargetSearchEngine, TargetingError,
};
use elevation::ElevationOracle;
use geodesy::{elevation_angle, midpoint, GeoPoint, GreatCircle, MEAN_EARTH_RADIUS};
use log::{debug, warn};
use serde::Serialize;
use tokio::sync::watch;

/// Formats a distance the way it is shown to users.
pub fn distance_label(distance_m: f64) -> String {
    if distance_m > 1_000.0 {
        format!("{:.2} km", distance_m / 1_000.0)
    } else {
        format!("{distance_m:.2} m")
    }
}

/// Everything a renderer needs to draw the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub origin: Option<GeoPoint>,
    pub target: Option<GeoPoint>,
    pub distance_m: Option<f64>,
    pub bearing_deg: Option<f64>,
    pub distance_label: Option<String>,
    pub midpoint: Option<GeoPoint>,

    /// Angle above the origin's horizon at which the target sits,
    /// when both elevations are known.
    pub elevation_angle_deg: Option<f64>,

    /// Most recent display rotation.
    pub rotation: Option<RotationCommand>,
}

/// Owns a [LocationState] and drives it from endpoint picks and
/// heading samples.
pub struct Session<O> {
    state: LocationState,
    sync: OrientationSync,
    engine: TargetSearchEngine<O>,
    rotation: Option<RotationCommand>,
}

impl<O: ElevationOracle> Session<O> {
    pub fn new(oracle: O, mode: OrientationMode) -> Self {
        Self {
            state: LocationState::default(),
            sync: OrientationSync::new(mode),
            engine: TargetSearchEngine::new(oracle),
            rotation: None,
        }
    }

    pub fn state(&self) -> &LocationState {
        &self.state
    }

    pub fn mode(&self) -> &OrientationMode {
        self.sync.mode()
    }

    pub fn set_mode(&mut self, mode: OrientationMode) {
        self.sync.set_mode(mode);
    }

    pub fn engine(&self) -> &TargetSearchEngine<O> {
        &self.engine
    }

    /// Sets the origin, then fills in its elevation if it has none.
    ///
    /// Returns the origin as finally committed.
    pub async fn pick_origin(&mut self, point: GeoPoint) -> GeoPoint {
        self.state.set_origin(point);
        match self.with_elevation(point).await {
            Some(point) => {
                self.state.set_origin(point);
                point
            }
            None => point,
        }
    }

    /// Sets the target, then fills in its elevation if it has none.
    pub async fn pick_target(&mut self, point: GeoPoint) -> GeoPoint {
        self.state.set_target(point);
        match self.with_elevation(point).await {
            Some(point) => {
                self.state.set_target(point);
                point
            }
            None => point,
        }
    }

    /// Returns `point` with a freshly looked up elevation, or `None`
    /// if it already had one or the lookup failed.
    async fn with_elevation(&self, point: GeoPoint) -> Option<GeoPoint> {
        if point.elevation().is_some() {
            return None;
        }
        match self.engine.oracle().elevation(&point).await {
            Ok(elevation_m) => Some(point.with_elevation(elevation_m)),
            Err(err) => {
                warn!("elevation of {point}: {err}");
                None
            }
        }
    }

    /// Applies one heading sample under the current mode.
    ///
    /// In elevation search mode this awaits the whole search and
    /// returns its outcome.
    pub async fn on_heading(
        &mut self,
        sample: &HeadingSample,
    ) -> Result<Option<SearchOutcome>, TargetingError> {
        match self.sync.react(&self.state, sample) {
            OrientationUpdate::Rotate(rotation) => {
                self.rotation = Some(rotation);
                Ok(None)
            }
            OrientationUpdate::Retarget { rotation, target } => {
                self.rotation = Some(rotation);
                self.state.set_target(target);
                Ok(None)
            }
            OrientationUpdate::Search {
                rotation,
                origin,
                bearing_deg,
                config,
            } => {
                self.rotation = Some(rotation);
                let outcome = self.engine.search(&origin, bearing_deg, &config).await?;
                self.state.set_target(outcome.target);
                Ok(Some(outcome))
            }
            OrientationUpdate::Idle => Ok(None),
        }
    }

    /// Processes heading samples from `rx` until its sender is dropped.
    ///
    /// Samples that arrive while one is being processed replace each
    /// other, so only the newest is handled next. `on_update` is
    /// called after each successfully processed sample.
    pub async fn follow_heading<F>(
        &mut self,
        mut rx: watch::Receiver<Option<HeadingSample>>,
        mut on_update: F,
    ) where
        F: FnMut(&SessionSnapshot, Option<&SearchOutcome>),
    {
        while rx.changed().await.is_ok() {
            let sample = *rx.borrow_and_update();
            let Some(sample) = sample else {
                continue;
            };
            debug!("heading {:.1}°", sample.heading_deg());
            match self.on_heading(&sample).await {
                Ok(outcome) => on_update(&self.snapshot(), outcome.as_ref()),
                Err(err) => warn!("heading {:.1}°: {err}", sample.heading_deg()),
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let origin = self.state.origin().copied();
        let target = self.state.target().copied();
        let derived = self.state.derived();
        let (midpoint, elevation_angle_deg) = match (&origin, &target, derived) {
            (Some(origin), Some(target), Some(derived)) => (
                Some(midpoint(origin, target)),
                origin
                    .elevation()
                    .zip(target.elevation())
                    .map(|(start_m, end_m)| {
                        elevation_angle(start_m, derived.distance_m, end_m, MEAN_EARTH_RADIUS)
                            .to_degrees()
                    }),
            ),
            _ => (None, None),
        };
        SessionSnapshot {
            origin,
            target,
            distance_m: derived.map(|d| d.distance_m),
            bearing_deg: derived.map(|d| d.bearing_deg),
            distance_label: derived.map(|d| distance_label(d.distance_m)),
            midpoint,
            elevation_angle_deg,
            rotation: self.rotation,
        }
    }

    /// Great circle path from origin to target with points no more
    /// than `max_step_m` apart.
    pub fn path(&self, max_step_m: f64) -> Option<Vec<GeoPoint>> {
        let origin = self.state.origin()?;
        let target = self.state.target()?;
        Some(GreatCircle::new(origin, max_step_m, target).collect())
    }

    /// Forgets both endpoints and the last rotation.
    pub fn clear(&mut self) {
        self.state.clear();
        self.rotation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{distance_label, Session};
    use crate::{
        test_oracle::ScriptedOracle, HeadingSample, OrientationMode, RotationCommand,
        SearchConfig, TargetingError,
    };
    use approx::assert_abs_diff_eq;
    use elevation::OracleError;
    use geodesy::{destination, GeoPoint};
    use tokio::sync::watch;

    fn origin() -> GeoPoint {
        GeoPoint::new(44.2705, -71.30325).unwrap()
    }

    fn heading(deg: f64) -> HeadingSample {
        HeadingSample::now(deg).unwrap()
    }

    /// 100 m everywhere except 200 m at 300 m from the origin.
    fn ridge_oracle() -> ScriptedOracle {
        ScriptedOracle::new(origin(), |d| Ok(if d == 300.0 { 200.0 } else { 100.0 }))
    }

    fn search_mode() -> OrientationMode {
        OrientationMode::ElevationSearch(SearchConfig::new(500.0, 50.0, 50.0).unwrap())
    }

    #[test]
    fn test_distance_label() {
        assert_eq!(distance_label(0.0), "0.00 m");
        assert_eq!(distance_label(456.2872), "456.29 m");
        assert_eq!(distance_label(1_000.0), "1000.00 m");
        assert_eq!(distance_label(1_234.5), "1.23 km");
    }

    #[tokio::test]
    async fn test_pick_origin_looks_up_elevation() {
        let mut session = Session::new(ridge_oracle(), OrientationMode::default());
        let picked = session.pick_origin(origin()).await;
        assert_eq!(picked.elevation(), Some(100.0));
        assert_eq!(session.state().origin().unwrap().elevation(), Some(100.0));
        assert_eq!(session.engine().oracle().calls(), vec![0.0]);

        // A known elevation is kept as is.
        let picked = session.pick_origin(origin().with_elevation(7.0)).await;
        assert_eq!(picked.elevation(), Some(7.0));
        assert_eq!(session.engine().oracle().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_point() {
        let oracle = ScriptedOracle::new(origin(), |_| Err(OracleError::NoData));
        let mut session = Session::new(oracle, search_mode());
        let picked = session.pick_origin(origin()).await;
        assert_eq!(picked, origin());
        assert_eq!(picked.elevation(), None);

        let result = session.on_heading(&heading(72.0)).await;
        assert_eq!(result, Err(TargetingError::MissingElevation));
        assert!(session.state().target().is_none());
        assert_eq!(
            session.snapshot().rotation,
            Some(RotationCommand { degrees: -72.0 })
        );
    }

    #[tokio::test]
    async fn test_fixed_distance_heading() {
        let mut session = Session::new(ridge_oracle(), OrientationMode::default());
        session.pick_origin(origin()).await;
        assert_eq!(session.on_heading(&heading(90.0)).await, Ok(None));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.target, Some(destination(&origin(), 90.0, 1_000.0)));
        assert_abs_diff_eq!(snapshot.distance_m.unwrap(), 1_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(snapshot.bearing_deg.unwrap(), 90.0, epsilon = 1e-6);
        assert_eq!(snapshot.distance_label.as_deref(), Some("1000.00 m"));
        assert_eq!(snapshot.rotation, Some(RotationCommand { degrees: -90.0 }));
        // Target has no elevation, so no angle.
        assert_eq!(snapshot.elevation_angle_deg, None);
    }

    #[tokio::test]
    async fn test_elevation_search_heading() {
        let mut session = Session::new(ridge_oracle(), search_mode());
        session.pick_origin(origin()).await;
        let outcome = session.on_heading(&heading(72.0)).await.unwrap().unwrap();
        assert_eq!(outcome.distance_m, 300.0);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.target, Some(outcome.target));
        assert_abs_diff_eq!(snapshot.distance_m.unwrap(), 300.0, epsilon = 1e-6);
        assert_abs_diff_eq!(snapshot.bearing_deg.unwrap(), 72.0, epsilon = 1e-6);
        // 100 m climb over 300 m, a little less than atan(1/3).
        let angle = snapshot.elevation_angle_deg.unwrap();
        assert!(angle > 18.0 && angle < 18.44, "{angle}");
        assert!(snapshot.midpoint.is_some());

        let path = session.path(70.0).unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.last(), Some(&outcome.target));
    }

    #[tokio::test]
    async fn test_follow_heading_keeps_latest() {
        let mut session = Session::new(ridge_oracle(), OrientationMode::default());
        session.pick_origin(origin()).await;

        let (tx, rx) = watch::channel(None);
        for deg in [10.0, 20.0, 30.0] {
            tx.send(Some(heading(deg))).unwrap();
        }
        drop(tx);

        let mut rotations = Vec::new();
        session
            .follow_heading(rx, |snapshot, outcome| {
                assert!(outcome.is_none());
                rotations.push(snapshot.rotation);
            })
            .await;
        assert_eq!(rotations, vec![Some(RotationCommand { degrees: -30.0 })]);
        assert_eq!(
            session.state().target(),
            Some(&destination(&origin(), 30.0, 1_000.0))
        );
    }

    #[tokio::test]
    async fn test_snapshot_serializes_and_clears() {
        let mut session = Session::new(ridge_oracle(), OrientationMode::FaceTarget);
        session.pick_origin(origin()).await;
        session
            .pick_target(destination(&origin(), 45.0, 2_500.0))
            .await;
        session.on_heading(&heading(0.0)).await.unwrap();

        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["distance_label"], "2.50 km");
        assert_eq!(json["origin"]["elevation"], 100.0);
        assert_abs_diff_eq!(json["rotation"]["degrees"].as_f64().unwrap(), -45.0, epsilon = 1e-6);

        session.clear();
        let snapshot = session.snapshot();
        assert!(snapshot.origin.is_none());
        assert!(snapshot.distance_label.is_none());
        assert!(snapshot.rotation.is_none());
        assert!(session.path(50.0).is_none());
    }
}
