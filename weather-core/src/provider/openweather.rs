use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::model::{CurrentWeather, WeatherQuery};

use super::WeatherProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the OpenWeather `weather` (current conditions) endpoint, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// `base_url` must end with a slash, e.g. `https://api.openweathermap.org/data/2.5/`.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    fn query_params(&self, query: &WeatherQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            WeatherQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            WeatherQuery::City(name) => vec![("q", name.clone())],
        };
        params.push(("units", "metric".to_string()));
        params.push(("APPID", self.api_key.clone()));
        params
    }

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<CurrentWeather> {
        let url = format!("{}weather", self.base_url);
        tracing::debug!(%query, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather for {query}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request for {} failed with status {}: {}",
                query,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, query: &WeatherQuery) -> Result<CurrentWeather> {
        self.fetch_current(query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
