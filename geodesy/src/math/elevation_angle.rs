use num_traits::{Float, FloatConst};
use std::cmp::Ordering;

/// Returns the up/down angle (in radians) from a point `start_elev_m`
/// above the surface to a point `end_elev_m` above the surface,
/// `distance_m` away along the surface.
///
/// Positive angles are above the start's local horizon. Earth
/// curvature is included, so two points at the same elevation see
/// each other slightly below the horizon.
pub fn elevation_angle<T>(start_elev_m: T, distance_m: T, end_elev_m: T, earth_radius: T) -> T
where
    T: Float + FloatConst,
{
    let one = T::one();
    let two = one + one;

    if distance_m <= T::zero() {
        return match end_elev_m.partial_cmp(&start_elev_m) {
            Some(Ordering::Greater) => T::FRAC_PI_2(),
            Some(Ordering::Less) => -T::FRAC_PI_2(),
            _ => T::zero(),
        };
    }

    // Triangle formed by earth's center and the two points.
    let b = earth_radius + start_elev_m;
    let c = earth_radius + end_elev_m;
    let half_central_angle = distance_m / (two * earth_radius);

    // Squared chord, arranged to avoid cancellation at short range.
    let a_sq = (c - b).powi(2) + two * two * b * c * half_central_angle.sin().powi(2);
    let a = a_sq.sqrt();

    let cos_from_nadir = ((a_sq + (b - c) * (b + c)) / (two * a * b))
        .max(-one)
        .min(one);
    cos_from_nadir.acos() - T::FRAC_PI_2()
}
