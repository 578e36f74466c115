//! Reverse geocoding: convert coordinates to place details.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{GeocodeError, Location, PlaceInfo};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Skybar/0.1.0 (https://github.com/skybar/skybar)";

/// Resolves coordinates into place details.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn resolve(&self, location: &Location) -> Result<PlaceInfo, GeocodeError>;
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: NOMINATIM_URL.to_string(),
        })
    }

    /// Point the geocoder at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn resolve(&self, location: &Location) -> Result<PlaceInfo, GeocodeError> {
        let url = format!(
            "{}?lat={}&lon={}&format=json&addressdetails=1&zoom=14",
            self.base_url, location.latitude, location.longitude
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Provider {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let payload: NominatimResponse = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let place = payload
            .address
            .map(NominatimAddress::into_place)
            .ok_or(GeocodeError::NoAddress)?;

        if let Some(name) = place.display_name() {
            tracing::info!("Reverse geocoded to: {}", name);
        }
        Ok(place)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    attraction: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    #[serde(rename = "state_district")]
    state_district: Option<String>,
    postcode: Option<String>,
}

impl NominatimAddress {
    fn into_place(self) -> PlaceInfo {
        PlaceInfo {
            area_of_interest: self.attraction,
            sub_locality: self.neighbourhood.or(self.suburb),
            locality: self.city.or(self.town).or(self.village).or(self.municipality),
            sub_administrative_area: self.county.or(self.state_district),
            postal_code: self.postcode,
        }
    }
}
