use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ResolveError, ResolveResult};
use crate::icon::{IconCategory, category_of};

/// Icon shown when a response carries no `weather` entry.
pub const DEFAULT_ICON_CODE: &str = "01d";

/// Degrees of latitude/longitude visible around the map center.
pub const MAP_SPAN_DEGREES: f64 = 0.5;

/// A non-empty city name used as the key for weather and geocoding lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityQuery(String);

impl CityQuery {
    /// Surrounding whitespace is trimmed; an empty result is rejected.
    pub fn new(name: impl Into<String>) -> ResolveResult<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for CityQuery {
    type Error = ResolveError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        CityQuery::new(value)
    }
}

/// Latitude/longitude in degrees, validated on construction and on
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = ResolveError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> ResolveResult<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ResolveError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub const fn origin() -> Self {
        Self { lat: 0.0, lon: 0.0 }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Visible map area: a center and a fixed square span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: Coordinate,
    pub span_degrees: f64,
}

impl MapRegion {
    pub fn centered_on(center: Coordinate) -> Self {
        Self { center, span_degrees: MAP_SPAN_DEGREES }
    }
}

impl Default for MapRegion {
    fn default() -> Self {
        Self::centered_on(Coordinate::origin())
    }
}

/// Current conditions for one city, as reported by a single successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city_label: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    /// Passed through from the provider unchanged.
    pub wind_speed_kph: f64,
    pub description: String,
    pub icon_code: String,
}

impl CurrentConditions {
    pub fn icon_category(&self) -> IconCategory {
        category_of(&self.icon_code)
    }
}

/// One slot of the provider forecast list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// `yyyy-MM-dd HH:mm:ss`, kept as received.
    pub timestamp: String,
    pub temperature_c: f64,
    pub icon_code: String,
}

impl ForecastEntry {
    pub fn icon_category(&self) -> IconCategory {
        category_of(&self.icon_code)
    }
}

/// Forecast entries in provider response order.
pub type Forecast = Vec<ForecastEntry>;
