use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;

use crate::{
    config::Config,
    error::{ResolveError, ResolveResult},
    model::{CityQuery, CurrentConditions, Forecast},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Source of current conditions and forecasts for a city.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_current(&self, city: &CityQuery) -> ResolveResult<CurrentConditions>;

    /// Entries come back in response order, unfiltered.
    async fn fetch_forecast(&self, city: &CityQuery) -> ResolveResult<Forecast>;
}

/// Construct the OpenWeather client from config.
pub fn weather_client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.require_api_key()?;
    Ok(OpenWeatherClient::new(api_key.to_owned())
        .with_base_url(config.base_url.clone())
        .with_language(config.language.clone()))
}

/// Maps a non-success status to the error taxonomy. 404 means the provider
/// has no match for `subject`.
pub(crate) fn check_status(status: StatusCode, body: &str, subject: &str) -> ResolveResult<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ResolveError::NotFound(subject.to_string()));
    }
    Err(ResolveError::Transport(format!(
        "request for {subject} failed with status {status}: {}",
        truncate_body(body)
    )))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
