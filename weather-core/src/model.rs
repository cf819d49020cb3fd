use serde::{Deserialize, Serialize};
use std::fmt;

use crate::icon::IconCategory;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Used when the user's own position cannot be obtained.
pub const FALLBACK_COORDINATES: Coordinates = Coordinates::new(18.51593, 73.92609);

/// What to ask the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Coordinates(Coordinates),
    City(String),
}

impl fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherQuery::Coordinates(c) => write!(f, "({c})"),
            WeatherQuery::City(name) => write!(f, "city '{name}'"),
        }
    }
}

/// Current-weather response, as returned by the `weather` endpoint.
///
/// Only the fields the dashboard reads are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: SystemInfo,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<ConditionInfo>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub wind: Option<Wind>,
}

impl CurrentWeather {
    /// Primary condition label ("Rain", "Clouds", ...), empty if the payload has none.
    pub fn condition_main(&self) -> &str {
        self.weather.first().map(|w| w.main.as_str()).unwrap_or_default()
    }

    /// Provider icon code such as "10d".
    pub fn icon_code(&self) -> Option<&str> {
        self.weather
            .first()
            .map(|w| w.icon.as_str())
            .filter(|code| !code.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionInfo {
    pub main: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

/// Weather at the user's location, replaced as a whole on every applied fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    /// Request id of the fetch that produced this snapshot; 0 before the first one.
    pub revision: u64,
    pub coordinates: Option<Coordinates>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub temperature_celsius: Option<i32>,
    pub temperature_fahrenheit: Option<i32>,
    pub humidity_percent: Option<i32>,
    pub condition_main: Option<String>,
    pub icon: IconCategory,
}

impl WeatherSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.temperature_celsius.is_some()
    }
}

pub const NOT_FOUND_MESSAGE: &str = "Not Found";

#[derive(Debug, Clone, PartialEq)]
pub struct SearchError {
    pub message: String,
    pub query: String,
}

impl SearchError {
    pub fn not_found(query: impl Into<String>) -> Self {
        Self {
            message: NOT_FOUND_MESSAGE.to_string(),
            query: query.into(),
        }
    }
}

/// Result of the latest settled city search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(CurrentWeather),
    NotFound(SearchError),
}

/// State owned by the city search panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub revision: u64,
    pub query_text: String,
    /// `None` until the first search settles.
    pub outcome: Option<SearchOutcome>,
}

impl SearchState {
    pub fn weather(&self) -> Option<&CurrentWeather> {
        match &self.outcome {
            Some(SearchOutcome::Found(weather)) => Some(weather),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SearchError> {
        match &self.outcome {
            Some(SearchOutcome::NotFound(err)) => Some(err),
            _ => None,
        }
    }
}

/// Rounds half-way values towards positive infinity (`-0.5` becomes `0`, `2.5` becomes `3`).
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

pub fn celsius_from_raw(raw: f64) -> i32 {
    round_half_up(raw)
}

pub fn fahrenheit_from_raw(raw_celsius: f64) -> i32 {
    round_half_up(raw_celsius * 1.8 + 32.0)
}
