//! Core library for the `weathercast` CLI.
//!
//! This crate defines:
//! - The decoded weather record and its display projection
//! - The web service, repository and resolver chain that turns a city name
//!   or coordinate pair into a record
//! - Configuration, credentials and the persisted last-searched city
//!
//! It is used by `weathercast-cli`, but can also be embedded by other front ends.

pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{Config, CredentialProvider, StaticCredential};
pub use error::{ErrorKind, WeatherError};
pub use model::{CardContent, Condition, DisplayContent, MainReadings, WeatherRecord};
pub use repository::{RemoteWeatherRepository, WeatherRepository};
pub use resolver::WeatherResolver;
pub use service::{OpenWeatherService, WeatherWebService};
pub use store::{CityStore, FileCityStore, MemoryCityStore, StoreError, StoredCity};

pub mod constants {
    pub const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
    pub const UNITS: &str = "imperial";
}
