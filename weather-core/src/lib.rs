//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its OpenWeather client
//! - Position sources, user notices and the refresh timer
//! - The location and city-search controllers
//! - Plain-text rendering of both panels
//!
//! It is used by `weather-cli`, but the controllers only depend on the traits
//! here, so another front end can drive them the same way.

pub mod config;
pub mod controller;
pub mod geolocation;
pub mod icon;
pub mod model;
pub mod notice;
pub mod provider;
pub mod render;
pub mod timer;

pub use config::{Config, GeolocationConfig, GeolocationMode};
pub use controller::{
    CitySearchController, FetchOutcome, LocationWeatherController, SearchTrigger,
};
pub use geolocation::{GeolocationError, Geolocator};
pub use icon::{IconCategory, classify_icon};
pub use model::{
    Coordinates, CurrentWeather, FALLBACK_COORDINATES, SearchError, SearchOutcome, SearchState,
    WeatherQuery, WeatherSnapshot,
};
pub use notice::{Notice, Notifier};
pub use provider::WeatherProvider;
pub use timer::{IntervalTimer, RefreshTimer};
