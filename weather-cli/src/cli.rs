use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Select, Text};
use weather_core::{
    CitySearchController, Config, Coordinates, GeolocationMode, SearchTrigger,
    provider::provider_from_config, render::SearchPanel,
};

use crate::dashboard::{self, DashboardOptions};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, default city and location source.
    Configure,

    /// Live dashboard: weather where you are, plus a city search panel.
    Dashboard {
        /// Use this latitude instead of the configured location source.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Use this longitude instead of the configured location source.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Do not try to determine the current location.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        no_geolocation: bool,
    },

    /// Show current weather for a city and exit.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Dashboard {
                lat,
                lon,
                no_geolocation,
            } => {
                let config = Config::load()?;
                let position = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                dashboard::run(
                    &config,
                    DashboardOptions {
                        position,
                        no_geolocation,
                    },
                )
                .await
            }
            Command::Show { city } => show(&city).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("API key prompt aborted")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    config.default_city = Text::new("Default city for the search panel:")
        .with_default(&config.default_city)
        .prompt()
        .context("Default city prompt aborted")?;

    let mode = Select::new("Location source:", GeolocationMode::all().to_vec())
        .prompt()
        .context("Location source prompt aborted")?;
    config.geolocation.mode = mode;

    if mode == GeolocationMode::Fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Latitude prompt aborted")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Longitude prompt aborted")?;
        config.geolocation.latitude = Some(latitude);
        config.geolocation.longitude = Some(longitude);
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(city: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let search = CitySearchController::new(provider);

    search.search(SearchTrigger::City(city.to_string())).await;

    let state = search.state();
    print!("{}", SearchPanel { state: &state });
    if state.error().is_some() {
        anyhow::bail!("no weather found for '{city}'");
    }
    Ok(())
}
