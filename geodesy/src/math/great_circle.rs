//! Great circle interpolation.
//!
//! Adapted from the [geo] crate's haversine intermediate routines:
//! both endpoints are turned into unit vectors once, so walking many
//! points along the same route costs only a few trig calls each.
//!
//! [geo](https://github.com/georust/geo/blob/eb0cd98f3ccfa226631af23d94d66d214ea66488/geo/src/algorithm/haversine_intermediate.rs)

use crate::{destination, distance, GeoPoint, MEAN_EARTH_RADIUS};
use std::f64::consts::FRAC_PI_2;

/// Below this, `sin(d)` is treated as zero for near-antipodal routes.
const ANTIPODAL_EPSILON: f64 = 1e-12;

/// Cap on the number of segments a [GreatCircle] will produce.
const MAX_SEGMENTS: f64 = u32::MAX as f64;

/// Precomputed state for interpolating between two points.
pub(crate) struct GreatCircleParams {
    start: GeoPoint,
    end: GeoPoint,

    /// Angular distance from `start` to `end` (radians).
    angular_distance: f64,

    /// Earth-centered unit vector to `start`.
    start_xyz: [f64; 3],

    /// Earth-centered unit vector to `end`.
    end_xyz: [f64; 3],
}

impl GreatCircleParams {
    pub(crate) fn new(start: &GeoPoint, end: &GeoPoint) -> Self {
        Self {
            start: *start,
            end: *end,
            angular_distance: distance(start, end) / MEAN_EARTH_RADIUS,
            start_xyz: unit_vector(start),
            end_xyz: unit_vector(end),
        }
    }

    /// Returns the point `fraction` of the way from start to end.
    ///
    /// The endpoints themselves are returned unchanged.
    pub(crate) fn point_at(&self, fraction: f64) -> GeoPoint {
        let d = self.angular_distance;
        if d == 0.0 || fraction == 0.0 {
            return self.start;
        }
        if fraction == 1.0 {
            return self.end;
        }

        let d_sin = d.sin();
        if d > FRAC_PI_2 && d_sin < ANTIPODAL_EPSILON {
            // Every great circle joins antipodes; head north.
            return destination(&self.start, 0.0, fraction * d * MEAN_EARTH_RADIUS);
        }

        let a = ((1.0 - fraction) * d).sin() / d_sin;
        let b = (fraction * d).sin() / d_sin;
        let [x, y, z] = [0, 1, 2].map(|i| a * self.start_xyz[i] + b * self.end_xyz[i]);

        GeoPoint::from_radians(z.atan2(x.hypot(y)), y.atan2(x))
    }
}

fn unit_vector(point: &GeoPoint) -> [f64; 3] {
    let (lat, lon) = point.radians();
    let (lat_sin, lat_cos) = lat.sin_cos();
    let (lon_sin, lon_cos) = lon.sin_cos();
    [lat_cos * lon_cos, lat_cos * lon_sin, lat_sin]
}

/// Evenly spaced points along the great circle from a start point to
/// an end point, both included.
pub struct GreatCircle {
    params: GreatCircleParams,
    step_size_m: f64,
    segments: usize,
    next_index: usize,
}

impl GreatCircle {
    /// Returns an iterator whose adjacent points are no more than
    /// `max_step_m` apart.
    ///
    /// A non-positive `max_step_m` yields just the two endpoints.
    pub fn new(start: &GeoPoint, max_step_m: f64, end: &GeoPoint) -> Self {
        let params = GreatCircleParams::new(start, end);
        let total_distance_m = params.angular_distance * MEAN_EARTH_RADIUS;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let segments = if max_step_m > 0.0 && total_distance_m > 0.0 {
            (total_distance_m / max_step_m).ceil().clamp(1.0, MAX_SEGMENTS) as usize
        } else {
            1
        };

        #[allow(clippy::cast_precision_loss)]
        let step_size_m = total_distance_m / segments as f64;

        Self {
            params,
            step_size_m,
            segments,
            next_index: 0,
        }
    }

    /// Actual distance between adjacent points.
    pub fn step_size_m(&self) -> f64 {
        self.step_size_m
    }

    pub fn total_distance_m(&self) -> f64 {
        self.params.angular_distance * MEAN_EARTH_RADIUS
    }
}

impl Iterator for GreatCircle {
    type Item = GeoPoint;

    #[allow(clippy::cast_precision_loss)]
    fn next(&mut self) -> Option<GeoPoint> {
        if self.next_index > self.segments {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        let point = if index == self.segments {
            self.params.end
        } else {
            self.params.point_at(index as f64 / self.segments as f64)
        };
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GreatCircle {
    fn len(&self) -> usize {
        (self.segments + 1).saturating_sub(self.next_index)
    }
}
