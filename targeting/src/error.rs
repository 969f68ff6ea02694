use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetingError {
    #[error("origin elevation is unknown")]
    MissingElevation,

    #[error("invalid search config: {0}")]
    InvalidConfig(&'static str),
}
