//! Position sources for the location panel.
//!
//! The dashboard has no browser geolocation API, so the position comes from
//! one of: the public IP address, fixed coordinates, or nothing at all.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    config::{GeolocationConfig, GeolocationMode},
    model::Coordinates,
};

pub const IP_LOOKUP_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Geolocation not available")]
    Unavailable,
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location request timed out")]
    Timeout,
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
}

/// Single-shot position source.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Whether this source can produce a position at all.
    fn is_available(&self) -> bool;

    /// May take arbitrarily long to resolve.
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Always reports the same coordinates.
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    coordinates: Coordinates,
}

impl FixedGeolocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.coordinates)
    }
}

/// No position source.
#[derive(Debug, Clone, Default)]
pub struct DisabledGeolocator;

#[async_trait]
impl Geolocator for DisabledGeolocator {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Approximate position from an ip-api.com style lookup.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    endpoint: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self::with_endpoint(IP_LOOKUP_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        let response = self
            .http
            .get(&self.endpoint)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeolocationError::Timeout
                } else {
                    GeolocationError::PositionUnavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(GeolocationError::PositionUnavailable(format!(
                "lookup returned status {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| GeolocationError::PositionUnavailable(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                tracing::debug!(lat, lon, "resolved position from IP address");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(GeolocationError::PositionUnavailable(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            )),
        }
    }
}

/// Build the position source selected in config.
pub fn geolocator_from_config(config: &GeolocationConfig) -> anyhow::Result<Arc<dyn Geolocator>> {
    let geolocator: Arc<dyn Geolocator> = match config.mode {
        GeolocationMode::Ip => Arc::new(IpGeolocator::new()),
        GeolocationMode::Fixed => {
            let coordinates = config.fixed_coordinates().ok_or_else(|| {
                anyhow::anyhow!(
                    "Geolocation mode 'fixed' needs both latitude and longitude.\n\
                     Hint: run `weather configure` or edit the [geolocation] table."
                )
            })?;
            Arc::new(FixedGeolocator::new(coordinates))
        }
        GeolocationMode::Off => Arc::new(DisabledGeolocator),
    };

    Ok(geolocator)
}
