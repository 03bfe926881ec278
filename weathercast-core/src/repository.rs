use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{error::WeatherError, model::WeatherRecord, service::WeatherWebService};

/// Seam between the resolver and the network layer.
#[async_trait]
pub trait WeatherRepository: Send + Sync + Debug {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherRecord, WeatherError>;

    async fn fetch_by_coordinates(&self, lat: f64, lon: f64)
    -> Result<WeatherRecord, WeatherError>;
}

/// Forwards every call to a [`WeatherWebService`] unchanged.
#[derive(Debug, Clone)]
pub struct RemoteWeatherRepository {
    web_service: Arc<dyn WeatherWebService>,
}

impl RemoteWeatherRepository {
    pub fn new(web_service: Arc<dyn WeatherWebService>) -> Self {
        Self { web_service }
    }
}

#[async_trait]
impl WeatherRepository for RemoteWeatherRepository {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        self.web_service.fetch_by_city(city).await
    }

    async fn fetch_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherRecord, WeatherError> {
        self.web_service.fetch_by_coordinates(lat, lon).await
    }
}
