use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeodesyError {
    #[error("invalid coordinate lat: {latitude}, lon: {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}
