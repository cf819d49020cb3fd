//! Plain-text views of the two panels.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

use crate::{
    icon::IconCategory,
    model::{SearchState, WeatherSnapshot, round_half_up},
};

pub const PROVIDER_ICON_BASE: &str = "https://openweathermap.org/img/wn/";

/// `"<Weekday>, <Day> <Month> <Year>"`, e.g. "Sunday, 18 October 2026".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %-d %B %Y").to_string()
}

/// 24-hour `HH:MM:SS`.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

pub fn provider_icon_url(code: &str) -> String {
    format!("{PROVIDER_ICON_BASE}{code}.png")
}

/// Location panel; shows a loading message until the first snapshot lands.
#[derive(Debug, Clone, Copy)]
pub struct LocationView<'a> {
    pub snapshot: &'a WeatherSnapshot,
    pub now: NaiveDateTime,
}

impl fmt::Display for LocationView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot;
        let Some(celsius) = snapshot.temperature_celsius else {
            writeln!(f, "Detecting your location")?;
            return writeln!(
                f,
                "Your current location will be displayed here & used for calculating real-time weather."
            );
        };

        writeln!(
            f,
            "{}, {}",
            snapshot.city.as_deref().unwrap_or_default(),
            snapshot.country.as_deref().unwrap_or_default()
        )?;
        writeln!(
            f,
            "{} {}  {}",
            snapshot.icon.glyph(),
            snapshot.icon,
            snapshot.condition_main.as_deref().unwrap_or_default()
        )?;
        writeln!(f, "{}", format_clock(self.now.time()))?;
        writeln!(f, "{}", format_date(self.now.date()))?;
        match snapshot.temperature_fahrenheit {
            Some(fahrenheit) => writeln!(f, "{celsius}°C ({fahrenheit}°F)"),
            None => writeln!(f, "{celsius}°C"),
        }
    }
}

/// Search results list: the searched city's readings, or the error line.
#[derive(Debug, Clone, Copy)]
pub struct SearchPanel<'a> {
    pub state: &'a SearchState,
}

impl fmt::Display for SearchPanel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(weather) = self.state.weather() {
            write!(
                f,
                "{}, {}",
                weather.name,
                weather.sys.country.as_deref().unwrap_or_default()
            )?;
            match weather.icon_code() {
                Some(code) => writeln!(f, "  {}", provider_icon_url(code))?,
                None => writeln!(f)?,
            }
            writeln!(
                f,
                "Temperature {}°c ({})",
                round_half_up(weather.main.temp),
                weather.condition_main()
            )?;
            writeln!(f, "Humidity {}%", round_half_up(weather.main.humidity))?;
            if let Some(visibility) = weather.visibility {
                writeln!(f, "Visibility {} mi", round_half_up(visibility))?;
            }
            if let Some(wind) = &weather.wind {
                writeln!(f, "Wind Speed {} Km/h", round_half_up(wind.speed))?;
            }
            Ok(())
        } else if let Some(err) = self.state.error() {
            writeln!(f, "{} {}", err.query, err.message)
        } else {
            Ok(())
        }
    }
}

/// Forecast panel: the location's icon and condition above the search box and results.
#[derive(Debug, Clone, Copy)]
pub struct ForecastPanel<'a> {
    pub icon: IconCategory,
    pub condition: Option<&'a str>,
    pub search: &'a SearchState,
}

impl fmt::Display for ForecastPanel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.icon.glyph(), self.icon)?;
        if let Some(condition) = self.condition {
            writeln!(f, "{condition}")?;
        }
        writeln!(f, "Search any city: {}", self.search.query_text)?;
        write!(f, "{}", SearchPanel { state: self.search })
    }
}

/// Whole dashboard: location panel, followed by the forecast panel once loaded.
#[derive(Debug, Clone, Copy)]
pub struct Dashboard<'a> {
    pub snapshot: &'a WeatherSnapshot,
    pub search: &'a SearchState,
    pub now: NaiveDateTime,
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            LocationView {
                snapshot: self.snapshot,
                now: self.now,
            }
        )?;
        if !self.snapshot.is_loaded() {
            return Ok(());
        }
        writeln!(f)?;
        write!(
            f,
            "{}",
            ForecastPanel {
                icon: self.snapshot.icon,
                condition: self.snapshot.condition_main.as_deref(),
                search: self.search,
            }
        )
    }
}
