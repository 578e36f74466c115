use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear, // Unknown codes default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Get the symbol name the renderer shows next to a sample
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle => "cloud_rain",
            Self::Rain => "cloud_rain",
            Self::HeavyRain => "cloud_rain",
            Self::Snow => "cloud_snow",
            Self::Sleet => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// A location update as delivered by the location source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
            timestamp: Utc::now(),
        }
    }
}

/// Current weather conditions, driving the status line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub icon: String,
    pub updated_at: DateTime<Utc>,
}

/// One forecast hour; immutable once received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub icon: String,
}

/// Sun events for one forecast day. Either event may be absent
/// (polar day/night, or the provider omitting the field).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySunEvents {
    pub date: NaiveDate,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

/// Complete fetched forecast bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub hourly: Vec<HourlySample>,
    pub daily: Vec<DailySunEvents>,
    pub fetched_at: DateTime<Utc>,
}

/// Resolved place details for a coordinate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub area_of_interest: Option<String>,
    pub sub_locality: Option<String>,
    pub locality: Option<String>,
    pub sub_administrative_area: Option<String>,
    pub postal_code: Option<String>,
}

impl PlaceInfo {
    /// The name shown for this place: the first present, non-empty field,
    /// from most specific to least.
    pub fn display_name(&self) -> Option<&str> {
        [
            &self.area_of_interest,
            &self.sub_locality,
            &self.locality,
            &self.sub_administrative_area,
            &self.postal_code,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .find(|name| !name.is_empty())
    }
}

/// Weather fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider returned status {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "Unable to reach the weather service.",
            FetchError::Provider { .. } => "The weather service returned an error.",
            FetchError::InvalidResponse(_) => "Received unexpected weather data.",
        }
    }
}

/// Reverse geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Geocoder returned status {status}")]
    Provider { status: u16 },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("No address found for coordinates")]
    NoAddress,
}

impl GeocodeError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeocodeError::Network(_) => "Unable to reach the geocoding service.",
            GeocodeError::Provider { .. } => "The geocoding service returned an error.",
            GeocodeError::InvalidResponse(_) => "Received unexpected geocoding data.",
            GeocodeError::NoAddress => "No place name found for this location.",
        }
    }
}

/// Location errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("No location has been delivered yet")]
    NoKnownLocation,
}
