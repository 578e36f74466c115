//! Weather fetching via the Open-Meteo forecast API.
//! Free, no API key required; timestamps requested as unixtime in UTC.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use skybar_core::TemperatureUnit;
use std::time::Duration;

use crate::types::{
    CurrentWeather, DailySunEvents, FetchError, HourlySample, Location, WeatherCondition,
    WeatherData,
};

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Source of forecast data for a location.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, location: &Location) -> Result<WeatherData, FetchError>;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: Client,
    base_url: String,
    unit: TemperatureUnit,
    forecast_days: u8,
}

impl OpenMeteoProvider {
    pub fn new(unit: TemperatureUnit, forecast_days: u8) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: OPEN_METEO_URL.to_string(),
            unit,
            forecast_days,
        })
    }

    /// Point the provider at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoProvider {
    async fn fetch(&self, location: &Location) -> Result<WeatherData, FetchError> {
        let mut params = vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current", "temperature_2m,weather_code".to_string()),
            ("hourly", "temperature_2m,weather_code".to_string()),
            ("daily", "sunrise,sunset".to_string()),
            ("timezone", "UTC".to_string()),
            ("timeformat", "unixtime".to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ];
        if let Some(unit) = unit_param(self.unit) {
            params.push(("temperature_unit", unit.to_string()));
        }

        let response = self.client.get(&self.base_url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let payload: ForecastResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        let weather = payload.into_weather()?;
        tracing::debug!(
            hours = weather.hourly.len(),
            days = weather.daily.len(),
            "Fetched forecast"
        );
        Ok(weather)
    }
}

fn unit_param(unit: TemperatureUnit) -> Option<&'static str> {
    match unit {
        TemperatureUnit::Auto => None,
        TemperatureUnit::Celsius => Some("celsius"),
        TemperatureUnit::Fahrenheit => Some("fahrenheit"),
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    hourly: HourlyBlock,
    #[serde(default)]
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: i64,
    temperature_2m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<i64>,
    temperature_2m: Vec<f64>,
    weather_code: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<i64>,
    #[serde(default)]
    sunrise: Vec<Option<i64>>,
    #[serde(default)]
    sunset: Vec<Option<i64>>,
}

impl ForecastResponse {
    fn into_weather(self) -> Result<WeatherData, FetchError> {
        let condition = WeatherCondition::from_wmo_code(self.current.weather_code);
        let current = CurrentWeather {
            temperature: self.current.temperature_2m,
            condition,
            icon: condition.icon_name().to_string(),
            updated_at: timestamp(self.current.time)?,
        };

        if self.hourly.time.len() != self.hourly.temperature_2m.len()
            || self.hourly.time.len() != self.hourly.weather_code.len()
        {
            return Err(FetchError::InvalidResponse(
                "hourly series lengths differ".to_string(),
            ));
        }

        let mut hourly = Vec::with_capacity(self.hourly.time.len());
        for ((time, temperature), code) in self
            .hourly
            .time
            .iter()
            .zip(&self.hourly.temperature_2m)
            .zip(&self.hourly.weather_code)
        {
            let condition = WeatherCondition::from_wmo_code(*code);
            hourly.push(HourlySample {
                time: timestamp(*time)?,
                temperature: *temperature,
                condition,
                icon: condition.icon_name().to_string(),
            });
        }

        let mut daily = Vec::new();
        if let Some(block) = self.daily {
            for (i, day) in block.time.iter().enumerate() {
                daily.push(DailySunEvents {
                    date: timestamp(*day)?.date_naive(),
                    sunrise: optional_timestamp(&block.sunrise, i)?,
                    sunset: optional_timestamp(&block.sunset, i)?,
                });
            }
        }

        Ok(WeatherData {
            current,
            hourly,
            daily,
            fetched_at: Utc::now(),
        })
    }
}

fn timestamp(ts: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::InvalidResponse(format!("timestamp {ts} out of range")))
}

fn optional_timestamp(
    series: &[Option<i64>],
    index: usize,
) -> Result<Option<DateTime<Utc>>, FetchError> {
    series
        .get(index)
        .copied()
        .flatten()
        .map(timestamp)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_payload() -> serde_json::Value {
        // 2024-08-06 10:00:00 UTC = 1722938400
        json!({
            "current": { "time": 1722938700, "temperature_2m": 21.4, "weather_code": 2 },
            "hourly": {
                "time": [1722938400, 1722942000, 1722945600],
                "temperature_2m": [21.0, 22.5, 23.1],
                "weather_code": [0, 2, 61]
            },
            "daily": {
                "time": [1722902400],
                "sunrise": [1722922980],
                "sunset": [1722974700]
            }
        })
    }

    fn provider_for(server: &MockServer) -> OpenMeteoProvider {
        OpenMeteoProvider::new(TemperatureUnit::Auto, 2)
            .unwrap()
            .with_base_url(format!("{}/v1/forecast", server.uri()))
    }

    #[tokio::test]
    async fn test_fetch_maps_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_payload()))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let weather = provider.fetch(&Location::new(47.6, -122.3)).await.unwrap();

        assert_eq!(weather.current.temperature, 21.4);
        assert_eq!(weather.current.condition, WeatherCondition::PartlyCloudy);
        assert_eq!(weather.hourly.len(), 3);
        assert_eq!(weather.hourly[2].condition, WeatherCondition::Rain);
        assert_eq!(weather.hourly[2].icon, "cloud_rain");
        assert_eq!(weather.daily.len(), 1);
        assert!(weather.daily[0].sunrise.is_some());
        assert!(weather.daily[0].sunset.is_some());
    }

    #[tokio::test]
    async fn test_fetch_sends_unit_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::new(TemperatureUnit::Fahrenheit, 2)
            .unwrap()
            .with_base_url(format!("{}/v1/forecast", server.uri()));
        provider.fetch(&Location::new(47.6, -122.3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_surfaces_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .fetch(&Location::new(47.6, -122.3))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Provider { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_mismatched_series() {
        let server = MockServer::start().await;
        let mut payload = sample_payload();
        payload["hourly"]["temperature_2m"] = json!([21.0]);
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .fetch(&Location::new(47.6, -122.3))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_tolerates_missing_daily_block() {
        let server = MockServer::start().await;
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("daily");
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let weather = provider.fetch(&Location::new(47.6, -122.3)).await.unwrap();
        assert!(weather.daily.is_empty());
    }

    #[test]
    fn test_null_sun_events_become_none() {
        let payload = json!({
            "current": { "time": 1722938700, "temperature_2m": 1.0, "weather_code": 0 },
            "hourly": { "time": [1722938400], "temperature_2m": [1.0], "weather_code": [0] },
            "daily": { "time": [1722902400], "sunrise": [null], "sunset": [null] }
        });
        let parsed: ForecastResponse = serde_json::from_value(payload).unwrap();
        let weather = parsed.into_weather().unwrap();
        assert_eq!(weather.daily[0].sunrise, None);
        assert_eq!(weather.daily[0].sunset, None);
    }
}
