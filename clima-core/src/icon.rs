//! Provider icon codes mapped to the semantic buckets the presentation layer
//! picks animation assets from.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconCategory {
    ClearDay,
    ClearNight,
    PartlyCloudy,
    Cloudy,
    Overcast,
    RainShower,
    Rain,
    Storm,
    Snow,
    Fog,
}

impl IconCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconCategory::ClearDay => "clear-day",
            IconCategory::ClearNight => "clear-night",
            IconCategory::PartlyCloudy => "partly-cloudy",
            IconCategory::Cloudy => "cloudy",
            IconCategory::Overcast => "overcast",
            IconCategory::RainShower => "rain-shower",
            IconCategory::Rain => "rain",
            IconCategory::Storm => "storm",
            IconCategory::Snow => "snow",
            IconCategory::Fog => "fog",
        }
    }
}

impl fmt::Display for IconCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized codes fall back to [`IconCategory::Overcast`].
pub fn category_of(code: &str) -> IconCategory {
    match code {
        "01d" => IconCategory::ClearDay,
        "01n" => IconCategory::ClearNight,
        "02d" | "02n" => IconCategory::PartlyCloudy,
        "03d" | "03n" => IconCategory::Cloudy,
        "04d" | "04n" => IconCategory::Overcast,
        "09d" | "09n" => IconCategory::RainShower,
        "10d" | "10n" => IconCategory::Rain,
        "11d" | "11n" => IconCategory::Storm,
        "13d" | "13n" => IconCategory::Snow,
        "50d" | "50n" => IconCategory::Fog,
        _ => IconCategory::Overcast,
    }
}
