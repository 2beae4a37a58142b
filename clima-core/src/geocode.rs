//! City name <-> coordinate lookups.
//!
//! Both directions are stateless and use only the first candidate the
//! backing service returns.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    config::Config,
    error::ResolveResult,
    model::{CityQuery, Coordinate},
};

pub mod openweather;

pub use openweather::OpenWeatherGeocoder;

#[async_trait]
pub trait GeocodeResolver: Send + Sync + Debug {
    /// Name to coordinates. `NotFound` when nothing matches.
    async fn forward(&self, city: &CityQuery) -> ResolveResult<Coordinate>;

    /// Coordinates to locality name. `NotFound` when the point has no
    /// locality, e.g. open ocean.
    async fn reverse(&self, coord: Coordinate) -> ResolveResult<CityQuery>;
}

/// Construct the OpenWeather geocoder from config.
pub fn geocoder_from_config(config: &Config) -> anyhow::Result<OpenWeatherGeocoder> {
    let api_key = config.require_api_key()?;
    Ok(OpenWeatherGeocoder::new(api_key.to_owned()).with_base_url(config.base_url.clone()))
}
