//! yr.no locationforecast client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{WeatherError, WeatherResult};

pub const DEFAULT_API_URL: &str =
    "https://aa015h6buqvih86i1.api.met.no/weatherapi/locationforecast/1.9/";

/// Fetches are abandoned after this many seconds.
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Where the forecast is for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    pub elevation: i64,
}

impl Coordinates {
    /// Query parameters as the API expects them.
    pub fn query(&self) -> [(&'static str, String); 3] {
        [
            ("lat", self.latitude.to_string()),
            ("lon", self.longitude.to_string()),
            ("msl", self.elevation.to_string()),
        ]
    }
}

/// Source of raw forecast documents.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch one forecast body. Anything but a 200 is an error.
    async fn fetch(&self) -> WeatherResult<String>;
}

/// HTTP client for the locationforecast API.
#[derive(Debug, Clone)]
pub struct YrClient {
    client: reqwest::Client,
    url: String,
    coordinates: Coordinates,
}

impl YrClient {
    pub fn new(url: impl Into<String>, coordinates: Coordinates) -> WeatherResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hearth/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| WeatherError::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            coordinates,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

fn transport_error(err: reqwest::Error) -> WeatherError {
    if err.is_timeout() {
        WeatherError::Timeout(FETCH_TIMEOUT_SECS)
    } else {
        WeatherError::Http(err.to_string())
    }
}

#[async_trait]
impl ForecastSource for YrClient {
    async fn fetch(&self) -> WeatherResult<String> {
        debug!(url = %self.url, coordinates = ?self.coordinates, "Fetching forecast");

        let resp = self
            .client
            .get(&self.url)
            .query(&self.coordinates.query())
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(WeatherError::Status {
                url: resp.url().to_string(),
                status,
            });
        }

        let body = resp.bytes().await.map_err(transport_error)?;
        String::from_utf8(body.to_vec())
            .map_err(|e| WeatherError::parse(format!("response is not UTF-8: {}", e)))
    }
}
