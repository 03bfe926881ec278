use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, instrument};

use crate::{
    config::{Config, CredentialProvider},
    constants::{API_BASE_URL, UNITS},
    error::WeatherError,
    model::WeatherRecord,
};

/// Network boundary: one request, one decoded record or one classified error.
#[async_trait]
pub trait WeatherWebService: Send + Sync + Debug {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherRecord, WeatherError>;

    async fn fetch_by_coordinates(&self, lat: f64, lon: f64)
    -> Result<WeatherRecord, WeatherError>;
}

/// OpenWeather current-weather client.
#[derive(Debug, Clone)]
pub struct OpenWeatherService {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl OpenWeatherService {
    pub fn new(http: Client, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::with_base_url(http, API_BASE_URL, credentials)
    }

    pub fn with_base_url(
        http: Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Service using the endpoint and credential from `config`.
    pub fn from_config(http: Client, config: Config) -> Self {
        let base_url = config.endpoint().to_owned();
        Self::with_base_url(http, base_url, Arc::new(config))
    }

    fn api_key(&self) -> Result<String, WeatherError> {
        self.credentials.api_key().ok_or(WeatherError::MissingCredential)
    }

    fn build_url(&self, params: &[(&str, &str)]) -> Result<Url, WeatherError> {
        Url::parse_with_params(&self.base_url, params)
            .map_err(|e| WeatherError::InvalidRequest(format!("{}: {e}", self.base_url)))
    }

    async fn fetch(&self, url: Url) -> Result<WeatherRecord, WeatherError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(WeatherError::Network)?;

        let status = res.status();
        let body = res.bytes().await.map_err(WeatherError::Network)?;
        debug!(%status, bytes = body.len(), "weather provider responded");

        if !status.is_success() {
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: api_error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_owned()),
            });
        }

        WeatherRecord::decode(&body)
    }
}

#[async_trait]
impl WeatherWebService for OpenWeatherService {
    #[instrument(skip(self))]
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        if city.contains(char::is_control) {
            return Err(WeatherError::InvalidRequest(format!(
                "city name {city:?} contains control characters"
            )));
        }

        let api_key = self.api_key()?;
        let url = self.build_url(&[("q", city), ("units", UNITS), ("appid", api_key.as_str())])?;

        debug!("requesting current weather by city");
        self.fetch(url).await
    }

    #[instrument(skip(self))]
    async fn fetch_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherRecord, WeatherError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(WeatherError::InvalidRequest(format!(
                "coordinates ({lat}, {lon}) are not finite"
            )));
        }

        let api_key = self.api_key()?;
        let (lat, lon) = (lat.to_string(), lon.to_string());
        let url = self.build_url(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("units", UNITS),
            ("appid", api_key.as_str()),
        ])?;

        debug!("requesting current weather by coordinates");
        self.fetch(url).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn api_error_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(parsed) => Some(parsed.message),
        Err(_) => Some(truncate_body(&String::from_utf8_lossy(body))),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
