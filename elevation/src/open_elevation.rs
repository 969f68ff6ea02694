//! [Open-Elevation](https://open-elevation.com) HTTP client.

use crate::{ElevationOracle, OracleError};
use async_trait::async_trait;
use geodesy::GeoPoint;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Public Open-Elevation lookup endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.open-elevation.com/api/v1/lookup";

/// Per-request timeout used by [OpenElevation::new].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenElevation {
    http: Client,

    /// Lookup URL, without query string.
    endpoint: String,
}

impl OpenElevation {
    /// Returns a client for the public endpoint.
    pub fn new() -> Result<Self, OracleError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// Returns a client for a self-hosted or mirrored endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, OracleError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn lookup_url(&self, point: &GeoPoint) -> String {
        format!(
            "{}?locations={},{}",
            self.endpoint,
            point.latitude(),
            point.longitude()
        )
    }
}

#[async_trait]
impl ElevationOracle for OpenElevation {
    async fn elevation(&self, point: &GeoPoint) -> Result<f64, OracleError> {
        let url = self.lookup_url(point);
        debug!("GET {url}");
        let response = self.http.get(&url).send().await?;
        check_status(&url, response.status())?;
        let body: LookupResponse = response.json().await?;
        body.elevation()
    }
}

/// Any non-2xx response is a `Network` failure.
fn check_status(url: &str, status: StatusCode) -> Result<(), OracleError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(OracleError::Network(format!("{url} returned {status}")))
    }
}

/// `{"results": [{"latitude": .., "longitude": .., "elevation": ..}]}`
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    #[serde(default)]
    elevation: Option<f64>,
}

impl LookupResponse {
    /// The first result's elevation; anything missing is `NoData`.
    fn elevation(&self) -> Result<f64, OracleError> {
        self.results
            .first()
            .and_then(|result| result.elevation)
            .ok_or(OracleError::NoData)
    }
}
