use serde::{Deserialize, Serialize};
use std::fmt;

/// Animated icon shown next to the current conditions.
///
/// Distinct from the provider's own icon codes ("10d", "01n", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IconCategory {
    #[default]
    ClearDay,
    Cloudy,
    Rain,
    Snow,
    Wind,
    Sleet,
    Fog,
}

impl IconCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconCategory::ClearDay => "CLEAR_DAY",
            IconCategory::Cloudy => "CLOUDY",
            IconCategory::Rain => "RAIN",
            IconCategory::Snow => "SNOW",
            IconCategory::Wind => "WIND",
            IconCategory::Sleet => "SLEET",
            IconCategory::Fog => "FOG",
        }
    }

    pub const fn all() -> &'static [IconCategory] {
        &[
            IconCategory::ClearDay,
            IconCategory::Cloudy,
            IconCategory::Rain,
            IconCategory::Snow,
            IconCategory::Wind,
            IconCategory::Sleet,
            IconCategory::Fog,
        ]
    }

    /// Small glyph used by the terminal renderer.
    pub fn glyph(&self) -> &'static str {
        match self {
            IconCategory::ClearDay => "☀",
            IconCategory::Cloudy => "☁",
            IconCategory::Rain => "☂",
            IconCategory::Snow => "❄",
            IconCategory::Wind => "≋",
            IconCategory::Sleet => "⛆",
            IconCategory::Fog => "▒",
        }
    }
}

impl fmt::Display for IconCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map the provider's primary condition label to an icon category.
///
/// Matching is exact; unknown labels (including "Clear" and the empty string)
/// map to [`IconCategory::ClearDay`].
pub fn classify_icon(condition_main: &str) -> IconCategory {
    match condition_main {
        "Haze" => IconCategory::ClearDay,
        "Clouds" => IconCategory::Cloudy,
        "Rain" => IconCategory::Rain,
        "Snow" => IconCategory::Snow,
        "Dust" | "Tornado" => IconCategory::Wind,
        "Drizzle" => IconCategory::Sleet,
        "Fog" | "Smoke" => IconCategory::Fog,
        _ => IconCategory::ClearDay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        let table = [
            ("Haze", IconCategory::ClearDay),
            ("Clouds", IconCategory::Cloudy),
            ("Rain", IconCategory::Rain),
            ("Snow", IconCategory::Snow),
            ("Dust", IconCategory::Wind),
            ("Drizzle", IconCategory::Sleet),
            ("Fog", IconCategory::Fog),
            ("Smoke", IconCategory::Fog),
            ("Tornado", IconCategory::Wind),
        ];

        for (condition, expected) in table {
            assert_eq!(classify_icon(condition), expected, "condition {condition}");
        }
    }

    #[test]
    fn unmapped_conditions_default_to_clear_day() {
        for condition in ["Clear", "", "Thunderstorm", "Mist", "rain", "CLOUDS"] {
            assert_eq!(classify_icon(condition), IconCategory::ClearDay, "condition {condition:?}");
        }
    }

    #[test]
    fn default_is_clear_day() {
        assert_eq!(IconCategory::default(), IconCategory::ClearDay);
    }

    #[test]
    fn names_match_animation_identifiers() {
        let names: Vec<&str> = IconCategory::all().iter().map(IconCategory::as_str).collect();
        assert_eq!(names, ["CLEAR_DAY", "CLOUDY", "RAIN", "SNOW", "WIND", "SLEET", "FOG"]);
        assert_eq!(IconCategory::Sleet.to_string(), "SLEET");
    }

    #[test]
    fn serde_uses_animation_identifiers() {
        let json = serde_json::to_string(&IconCategory::ClearDay).expect("serialize");
        assert_eq!(json, "\"CLEAR_DAY\"");
    }
}
