mod elevation_angle;
mod great_circle;

pub use {elevation_angle::elevation_angle, great_circle::GreatCircle};

pub(crate) use great_circle::GreatCircleParams;
