//! Reverse-geocoding client
//!
//! Resolves a coordinate to "City, Country" through a Nominatim-compatible
//! service. The public service allows roughly one request per second, so every
//! lookup waits a fixed delay before going out and lookups are serialized.
//! Failures never reach the caller: they become place sentinels.

use std::time::Duration;

use axum::async_trait;
use geoshift_common::calibration::{PLACE_LOOKUP_FAILED, PLACE_NOT_FOUND};
use geoshift_common::CoordinatePoint;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;

const USER_AGENT: &str = concat!("GeoShift/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Geocoder client errors
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}")]
    Api(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Resolves coordinates to human-readable place names
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Place name for `point`, or a place sentinel. Never fails.
    async fn lookup(&self, point: CoordinatePoint) -> String;
}

/// Nominatim `/reverse` response (only the fields used)
#[derive(Debug, Default, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// "City, Country", whichever half is known, or the not-found sentinel.
    pub fn place(&self) -> String {
        let locality = [
            &self.city,
            &self.town,
            &self.village,
            &self.municipality,
            &self.county,
            &self.state,
        ]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty());
        let country = self.country.as_ref().filter(|s| !s.is_empty());

        match (locality, country) {
            (Some(locality), Some(country)) => format!("{}, {}", locality, country),
            (Some(locality), None) => locality.clone(),
            (None, Some(country)) => country.clone(),
            (None, None) => PLACE_NOT_FOUND.to_string(),
        }
    }
}

/// Nominatim reverse-geocoding client
pub struct NominatimClient {
    http_client: reqwest::Client,
    base_url: String,
    language: String,
    /// Held for the whole delay + request so lookups never overlap
    gate: Mutex<()>,
    delay: Duration,
}

impl NominatimClient {
    pub fn new(base_url: &str, language: &str, delay: Duration) -> Result<Self, GeocodeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
            gate: Mutex::new(()),
            delay,
        })
    }

    /// Query the service without sentinel mapping.
    pub async fn reverse(&self, point: CoordinatePoint) -> Result<ReverseResponse, GeocodeError> {
        let _guard = self.gate.lock().await;

        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "Rate limiting geocoder request");
        tokio::time::sleep(self.delay).await;

        let url = format!("{}/reverse", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("lat", point.lat.to_string()),
                ("lon", point.lon.to_string()),
                ("format", "json".to_string()),
                ("accept-language", self.language.clone()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Api(status.as_u16()));
        }

        response
            .json::<ReverseResponse>()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PlaceLookup for NominatimClient {
    async fn lookup(&self, point: CoordinatePoint) -> String {
        match self.reverse(point).await {
            Ok(response) => {
                let place = response.address.place();
                tracing::info!(lat = point.lat, lon = point.lon, place = %place, "Resolved place");
                place
            }
            Err(e @ (GeocodeError::Network(_) | GeocodeError::Api(_))) => {
                tracing::warn!(error = %e, "Reverse geocoding failed");
                PLACE_LOOKUP_FAILED.to_string()
            }
            Err(e @ GeocodeError::Parse(_)) => {
                tracing::warn!(error = %e, "Unexpected geocoder response");
                PLACE_NOT_FOUND.to_string()
            }
        }
    }
}
