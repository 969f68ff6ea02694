use crate::{math::GreatCircleParams, GeoPoint, MEAN_EARTH_RADIUS};

/// Wraps `degrees` into [0, 360).
pub fn normalize_bearing(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid rounds up to the modulus for tiny negative inputs.
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Wraps `degrees` into [-180, 180).
pub fn normalize_longitude(degrees: f64) -> f64 {
    let normalized = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if normalized >= 180.0 {
        -180.0
    } else {
        normalized
    }
}

/// Returns the initial bearing, in degrees clockwise from true north,
/// of the great circle route from `from` to `to`.
///
/// The bearing between coincident points is meaningless; by
/// convention it is 0.
pub fn bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if from == to {
        return 0.0;
    }

    let (lat1, lon1) = from.radians();
    let (lat2, lon2) = to.radians();
    let (lat1_sin, lat1_cos) = lat1.sin_cos();
    let (lat2_sin, lat2_cos) = lat2.sin_cos();
    let (delta_lon_sin, delta_lon_cos) = (lon2 - lon1).sin_cos();

    let y = delta_lon_sin * lat2_cos;
    let x = lat1_cos * lat2_sin - lat1_sin * lat2_cos * delta_lon_cos;

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Returns the point `distance_m` meters from `origin` along the
/// great circle leaving it at `bearing_deg`.
///
/// A zero or non-finite distance, or a non-finite bearing, returns
/// `origin` unchanged, elevation included. Any other result has no elevation.
pub fn destination(origin: &GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    if distance_m == 0.0 || !distance_m.is_finite() || !bearing_deg.is_finite() {
        return *origin;
    }

    let angular_distance = distance_m / MEAN_EARTH_RADIUS;
    let (lat1, lon1) = origin.radians();
    let (lat1_sin, lat1_cos) = lat1.sin_cos();
    let (ad_sin, ad_cos) = angular_distance.sin_cos();
    let (theta_sin, theta_cos) = bearing_deg.to_radians().sin_cos();

    let lat2_sin = (lat1_sin * ad_cos + lat1_cos * ad_sin * theta_cos).clamp(-1.0, 1.0);
    let lat2 = lat2_sin.asin();

    let y = theta_sin * ad_sin * lat1_cos;
    let x = ad_cos - lat1_sin * lat2_sin;
    let lon2 = lon1 + y.atan2(x);

    GeoPoint::from_radians(lat2, lon2)
}

/// Returns the great circle distance, in meters, between `a` and `b`.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lon1) = a.radians();
    let (lat2, lon2) = b.radians();

    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);

    // Round-off can push `h` a hair past 1 for antipodal points.
    2.0 * MEAN_EARTH_RADIUS * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Returns the point `fraction` of the way along the great circle from
/// `a` to `b`.
pub fn intermediate(a: &GeoPoint, b: &GeoPoint, fraction: f64) -> GeoPoint {
    GreatCircleParams::new(a, b).point_at(fraction)
}

/// Returns the point halfway along the great circle from `a` to `b`.
pub fn midpoint(a: &GeoPoint, b: &GeoPoint) -> GeoPoint {
    intermediate(a, b, 0.5)
}
