use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Shown in place of a description when the provider reports no conditions.
pub const NOT_AVAILABLE: &str = "Not Available";

/// Unit suffix for temperatures; requests always ask for imperial units.
pub const TEMPERATURE_UNIT: &str = "°F";

/// Current weather for one location, as decoded from the provider.
///
/// Wire names follow the OpenWeather current-weather payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "weather")]
    pub conditions: Vec<Condition>,
    pub main: MainReadings,
    #[serde(rename = "name")]
    pub city_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Temperatures are in °F.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
}

impl WeatherRecord {
    /// Decode a response body. Either the whole record decodes or nothing does.
    pub fn decode(body: &[u8]) -> Result<Self, WeatherError> {
        if body.is_empty() {
            return Err(WeatherError::NoData);
        }

        Ok(serde_json::from_slice(body)?)
    }

    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// Presentable projection of a [`WeatherRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayContent {
    pub title: String,
    pub card: CardContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub city_name: String,
    pub temperature_text: String,
    pub description_text: String,
    pub icon: String,
}

impl DisplayContent {
    pub fn from_record(record: &WeatherRecord) -> Self {
        let condition = record.primary_condition();

        let description_text = condition
            .map(|c| capitalize_words(&c.description))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let icon = condition.map(|c| c.icon.clone()).unwrap_or_default();

        Self {
            title: record.city_name.clone(),
            card: CardContent {
                city_name: record.city_name.clone(),
                temperature_text: temperature_text(record.main.temp),
                description_text,
                icon,
            },
        }
    }
}

/// Nearest whole degree, ties away from zero.
pub fn temperature_text(temp: f64) -> String {
    format!("{} {TEMPERATURE_UNIT}", temp.round() as i64)
}

/// Upper-case the first letter of each word and lower-case the rest.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out
}
