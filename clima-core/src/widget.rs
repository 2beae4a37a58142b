//! Home-screen widget timeline.
//!
//! The widget is a separate consumer: it never reads the coordinator's
//! [`DisplayStore`](crate::state::DisplayStore) and refreshes on its own
//! fixed interval.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::{
    config::{Config, DEFAULT_CITY, DEFAULT_WIDGET_REFRESH_MINUTES},
    format,
    model::CityQuery,
    provider::WeatherClient,
};

pub const PLACEHOLDER_TEMPERATURE: &str = "--°C";
pub const PLACEHOLDER_CITY: &str = "Ciudad";
pub const FALLBACK_TEMPERATURE: &str = "25°C";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetEntry {
    pub date: DateTime<Utc>,
    pub temperature: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetTimeline {
    pub entries: Vec<WidgetEntry>,
    /// The widget asks for a new timeline after this instant.
    pub next_refresh: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WidgetProvider {
    city: String,
    refresh: Duration,
    weather: Option<Arc<dyn WeatherClient>>,
}

impl Default for WidgetProvider {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            refresh: Duration::minutes(i64::from(DEFAULT_WIDGET_REFRESH_MINUTES)),
            weather: None,
        }
    }
}

impl WidgetProvider {
    pub fn from_config(config: &Config) -> Self {
        Self {
            city: config.default_city.clone(),
            refresh: Duration::minutes(i64::from(config.widget_refresh_minutes.max(1))),
            weather: None,
        }
    }

    /// Fetch live conditions on each timeline request instead of showing the
    /// static entry.
    pub fn with_live_source(mut self, weather: Arc<dyn WeatherClient>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh
    }

    /// Shown while the widget has never rendered.
    pub fn placeholder(&self, now: DateTime<Utc>) -> WidgetEntry {
        WidgetEntry {
            date: now,
            temperature: PLACEHOLDER_TEMPERATURE.to_string(),
            city: PLACEHOLDER_CITY.to_string(),
        }
    }

    /// Static entry used for previews and whenever no live data is available.
    pub fn snapshot(&self, now: DateTime<Utc>) -> WidgetEntry {
        WidgetEntry {
            date: now,
            temperature: FALLBACK_TEMPERATURE.to_string(),
            city: DEFAULT_CITY.to_string(),
        }
    }

    pub async fn timeline(&self, now: DateTime<Utc>) -> WidgetTimeline {
        let entry = match self.live_entry(now).await {
            Some(entry) => entry,
            None => self.snapshot(now),
        };

        WidgetTimeline { entries: vec![entry], next_refresh: now + self.refresh }
    }

    async fn live_entry(&self, now: DateTime<Utc>) -> Option<WidgetEntry> {
        let weather = self.weather.as_ref()?;
        let city = CityQuery::new(self.city.as_str()).ok()?;

        match weather.fetch_current(&city).await {
            Ok(conditions) => Some(WidgetEntry {
                date: now,
                temperature: format::temperature(conditions.temperature_c),
                city: conditions.city_label,
            }),
            Err(err) => {
                debug!(%err, %city, "widget falling back to static entry");
                None
            }
        }
    }
}
