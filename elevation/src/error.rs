use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("elevation request failed: {0}")]
    Network(String),

    #[error("no elevation data")]
    NoData,
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
