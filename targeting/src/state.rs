use geodesy::{bearing, distance, GeoPoint};
use serde::Serialize;

/// Quantities computed from both endpoints together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Derived {
    pub distance_m: f64,
    pub bearing_deg: f64,
}

/// Origin and target of the current session.
///
/// [Derived] values exist exactly when both endpoints do, and are
/// recomputed by every setter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationState {
    origin: Option<GeoPoint>,
    target: Option<GeoPoint>,
    derived: Option<Derived>,
}

impl LocationState {
    pub fn set_origin(&mut self, point: GeoPoint) {
        self.origin = Some(point);
        self.recompute();
    }

    pub fn set_target(&mut self, point: GeoPoint) {
        self.target = Some(point);
        self.recompute();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn origin(&self) -> Option<&GeoPoint> {
        self.origin.as_ref()
    }

    pub fn target(&self) -> Option<&GeoPoint> {
        self.target.as_ref()
    }

    pub fn derived(&self) -> Option<Derived> {
        self.derived
    }

    pub fn derived_distance(&self) -> Option<f64> {
        self.derived.map(|d| d.distance_m)
    }

    pub fn derived_bearing(&self) -> Option<f64> {
        self.derived.map(|d| d.bearing_deg)
    }

    fn recompute(&mut self) {
        self.derived = match (&self.origin, &self.target) {
            (Some(origin), Some(target)) => Some(Derived {
                distance_m: distance(origin, target),
                bearing_deg: bearing(origin, target),
            }),
            _ => None,
        };
    }
}
