//! In-memory stand-ins for the network side of the pipeline.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    io,
    sync::{Arc, Mutex},
};
use tokio::sync::Notify;

use crate::{
    error::WeatherError,
    model::{Condition, MainReadings, WeatherRecord},
    repository::WeatherRepository,
    service::WeatherWebService,
    store::{CityStore, StoreError},
};

pub(crate) fn record(city: &str, temp: f64, description: &str) -> WeatherRecord {
    WeatherRecord {
        conditions: vec![Condition {
            id: 800,
            main: "Clear".into(),
            description: description.into(),
            icon: "01d".into(),
        }],
        main: MainReadings {
            temp,
            feels_like: temp,
            temp_min: temp - 2.0,
            temp_max: temp + 2.0,
            pressure: 1013,
            humidity: 50,
        },
        city_name: city.into(),
    }
}

/// Canned web service. Unknown cities answer like the provider does (404).
#[derive(Debug, Default)]
pub(crate) struct StubWeather {
    records: Mutex<HashMap<String, WeatherRecord>>,
    coordinate_record: Mutex<Option<WeatherRecord>>,
    failure: Mutex<Option<fn() -> WeatherError>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    city_calls: Mutex<Vec<String>>,
    coordinate_calls: Mutex<Vec<(f64, f64)>>,
}

impl StubWeather {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_city(self, city: &str, temp: f64) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(city.to_owned(), record(city, temp, "clear sky"));
        self
    }

    pub(crate) fn with_coordinate_record(self, record: WeatherRecord) -> Self {
        *self.coordinate_record.lock().unwrap() = Some(record);
        self
    }

    /// Every subsequent call fails with the error `make` builds.
    pub(crate) fn fail_with(&self, make: fn() -> WeatherError) {
        *self.failure.lock().unwrap() = Some(make);
    }

    pub(crate) fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Hold requests for `city` until the returned handle is notified.
    pub(crate) fn gate(&self, city: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(city.to_owned(), notify.clone());
        notify
    }

    pub(crate) fn city_calls(&self) -> Vec<String> {
        self.city_calls.lock().unwrap().clone()
    }

    pub(crate) fn coordinate_calls(&self) -> Vec<(f64, f64)> {
        self.coordinate_calls.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<WeatherError> {
        let make = *self.failure.lock().unwrap();
        make.map(|make| make())
    }
}

#[async_trait]
impl WeatherWebService for StubWeather {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        self.city_calls.lock().unwrap().push(city.to_owned());

        let gate = self.gates.lock().unwrap().get(city).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(err) = self.failure() {
            return Err(err);
        }

        self.records
            .lock()
            .unwrap()
            .get(city)
            .cloned()
            .ok_or_else(|| WeatherError::Api {
                status: 404,
                message: "city not found".into(),
            })
    }

    async fn fetch_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherRecord, WeatherError> {
        self.coordinate_calls.lock().unwrap().push((lat, lon));

        if let Some(err) = self.failure() {
            return Err(err);
        }

        self.coordinate_record
            .lock()
            .unwrap()
            .clone()
            .ok_or(WeatherError::NoData)
    }
}

#[async_trait]
impl WeatherRepository for StubWeather {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        WeatherWebService::fetch_by_city(self, city).await
    }

    async fn fetch_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherRecord, WeatherError> {
        WeatherWebService::fetch_by_coordinates(self, lat, lon).await
    }
}

/// City store whose reads and/or writes fail with an I/O error.
#[derive(Debug, Default)]
pub(crate) struct FailingCityStore {
    city: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    saves: Mutex<Vec<String>>,
}

impl FailingCityStore {
    pub(crate) fn unreadable() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub(crate) fn unwritable(city: Option<&str>) -> Self {
        Self {
            city: city.map(str::to_owned),
            fail_writes: true,
            ..Self::default()
        }
    }

    pub(crate) fn saves(&self) -> Vec<String> {
        self.saves.lock().unwrap().clone()
    }

    fn error() -> StoreError {
        StoreError::Io {
            path: "state.toml".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        }
    }
}

impl CityStore for FailingCityStore {
    fn last_searched_city(&self) -> Result<Option<String>, StoreError> {
        if self.fail_reads {
            return Err(Self::error());
        }
        Ok(self.city.clone())
    }

    fn save_last_searched_city(&self, city: &str) -> Result<(), StoreError> {
        self.saves.lock().unwrap().push(city.to_owned());
        if self.fail_writes {
            return Err(Self::error());
        }
        Ok(())
    }
}
