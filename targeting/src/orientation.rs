//! Turning device heading into display rotation and targets.

use crate::{LocationState, SearchConfig};
use geodesy::{bearing, destination, normalize_bearing, GeoPoint};
use serde::Serialize;
use std::time::Instant;

/// Range used by [OrientationMode::FixedDistance] unless configured.
pub const DEFAULT_PROJECTION_DISTANCE_M: f64 = 1_000.0;

/// A compass reading from the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSample {
    /// Degrees clockwise from north, in [0, 360).
    heading_deg: f64,
    timestamp: Instant,
}

impl HeadingSample {
    /// Returns `None` if `heading_deg` is not finite.
    pub fn new(heading_deg: f64, timestamp: Instant) -> Option<Self> {
        heading_deg.is_finite().then(|| Self {
            heading_deg: normalize_bearing(heading_deg),
            timestamp,
        })
    }

    pub fn now(heading_deg: f64) -> Option<Self> {
        Self::new(heading_deg, Instant::now())
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}

/// Rotate the rendered surface by `degrees` (clockwise positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RotationCommand {
    pub degrees: f64,
}

/// What a heading sample should do besides rotating the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationMode {
    /// Place the target `distance_m` away along the heading.
    FixedDistance { distance_m: f64 },

    /// Search along the heading for an elevation change.
    ElevationSearch(SearchConfig),

    /// Rotate so the target is straight up; the heading is ignored.
    FaceTarget,
}

impl Default for OrientationMode {
    fn default() -> Self {
        Self::FixedDistance {
            distance_m: DEFAULT_PROJECTION_DISTANCE_M,
        }
    }
}

/// The result of reacting to one heading sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationUpdate {
    /// Only the display rotation changes.
    Rotate(RotationCommand),

    /// Rotate and replace the target.
    Retarget {
        rotation: RotationCommand,
        target: GeoPoint,
    },

    /// Rotate, then search from `origin` along `bearing_deg`.
    Search {
        rotation: RotationCommand,
        origin: GeoPoint,
        bearing_deg: f64,
        config: SearchConfig,
    },

    /// Nothing to do until both endpoints are known.
    Idle,
}

/// Maps heading samples to updates according to the selected mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationSync {
    mode: OrientationMode,
}

impl OrientationSync {
    pub fn new(mode: OrientationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &OrientationMode {
        &self.mode
    }

    pub fn set_mode(&mut self, mode: OrientationMode) {
        self.mode = mode;
    }

    /// Counter-rotates the display so the device's forward direction
    /// stays at the top.
    pub fn on_heading_sample(&self, sample: &HeadingSample) -> RotationCommand {
        RotationCommand {
            degrees: -sample.heading_deg(),
        }
    }

    pub fn project_target_from_heading(
        &self,
        origin: &GeoPoint,
        heading_deg: f64,
        distance_m: f64,
    ) -> GeoPoint {
        destination(origin, heading_deg, distance_m)
    }

    pub fn bearing_to_face_target(&self, origin: &GeoPoint, target: &GeoPoint) -> f64 {
        bearing(origin, target)
    }

    /// Decides what `sample` means under the current mode.
    ///
    /// Does not touch `state`; the caller applies any new target.
    pub fn react(&self, state: &LocationState, sample: &HeadingSample) -> OrientationUpdate {
        let rotation = self.on_heading_sample(sample);
        match (self.mode, state.origin()) {
            (OrientationMode::FaceTarget, Some(origin)) => match state.target() {
                Some(target) => OrientationUpdate::Rotate(RotationCommand {
                    degrees: -self.bearing_to_face_target(origin, target),
                }),
                None => OrientationUpdate::Idle,
            },
            (OrientationMode::FaceTarget, None) => OrientationUpdate::Idle,
            (_, None) => OrientationUpdate::Rotate(rotation),
            (OrientationMode::FixedDistance { distance_m }, Some(origin)) => {
                OrientationUpdate::Retarget {
                    rotation,
                    target: self.project_target_from_heading(
                        origin,
                        sample.heading_deg(),
                        distance_m,
                    ),
                }
            }
            (OrientationMode::ElevationSearch(config), Some(origin)) => OrientationUpdate::Search {
                rotation,
                origin: *origin,
                bearing_deg: sample.heading_deg(),
                config,
            },
        }
    }
}
