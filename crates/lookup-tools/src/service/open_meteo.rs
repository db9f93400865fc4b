//! Open-Meteo Weather
//!
//! Requests current conditions plus the hourly forecast for a coordinate and
//! keeps only `current.temperature_2m`, exactly as the service reported it.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Number, Value};

use super::WeatherLookup;
use crate::error::{LookupError, Result};

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1";
const CURRENT_FIELDS: &str = "temperature_2m,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";

/// Open-Meteo configuration
#[derive(Clone, Debug)]
pub struct OpenMeteoConfig {
    pub base_url: String,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

impl OpenMeteoConfig {
    pub fn from_env() -> Self {
        std::env::var("OPEN_METEO_BASE_URL")
            .map(|base_url| Self { base_url })
            .unwrap_or_default()
    }
}

/// Open-Meteo forecast client
pub struct OpenMeteoClient {
    client: Client,
    config: OpenMeteoConfig,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new(OpenMeteoConfig::default())
    }
}

impl OpenMeteoClient {
    pub fn new(config: OpenMeteoConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(OpenMeteoConfig::from_env())
    }
}

#[async_trait]
impl WeatherLookup for OpenMeteoClient {
    async fn current_temperature(&self, latitude: f64, longitude: f64) -> Result<Number> {
        let url = format!("{}/forecast", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let reason = body["reason"].as_str().unwrap_or("no reason given");
            return Err(LookupError::Weather(format!("{}: {}", status, reason)));
        }

        let body: Value = response.json().await?;
        match &body["current"]["temperature_2m"] {
            Value::Number(n) => Ok(n.clone()),
            _ => Err(LookupError::MissingField("current.temperature_2m")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenMeteoClient {
        OpenMeteoClient::new(OpenMeteoConfig { base_url: server.uri() })
    }

    #[test]
    fn test_config_defaults() {
        assert_eq!(OpenMeteoConfig::default().base_url, "https://api.open-meteo.com/v1");
    }

    #[tokio::test]
    async fn test_returns_current_temperature_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("latitude", "0"))
            .and(query_param("longitude", "0"))
            .and(query_param("current", "temperature_2m,wind_speed_10m"))
            .and(query_param("hourly", "temperature_2m,relative_humidity_2m,wind_speed_10m"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {"time": "2025-03-14T12:00", "temperature_2m": 27.35, "wind_speed_10m": 11.2},
                "hourly": {"time": [], "temperature_2m": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let temperature = client(&server).current_temperature(0.0, 0.0).await.unwrap();
        assert_eq!(temperature.to_string(), "27.35");
    }

    #[tokio::test]
    async fn test_missing_field_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": {"wind_speed_10m": 3.0}})))
            .mount(&server)
            .await;

        let err = client(&server).current_temperature(52.5, 13.4).await.unwrap_err();
        assert!(matches!(err, LookupError::MissingField("current.temperature_2m")));
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°."
            })))
            .mount(&server)
            .await;

        let err = client(&server).current_temperature(120.0, 13.4).await.unwrap_err();
        assert!(matches!(err, LookupError::Weather(msg) if msg.contains("Latitude")));
    }
}
