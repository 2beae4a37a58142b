//! Core library for the `clima` weather front end.
//!
//! This crate defines:
//! - Typed lookups against the weather and geocoding services
//! - The observable display snapshot and its single writer
//! - The coordinator reconciling overlapping lookups into that snapshot
//! - The independent home-screen widget timeline
//!
//! It is used by `clima-cli`, but can also back other front ends.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod geocode;
pub mod icon;
pub mod model;
pub mod provider;
pub mod state;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use coordinator::{Resolution, ResolutionCoordinator, SequencingPolicy};
pub use error::{ResolveError, ResolveResult};
pub use geocode::{GeocodeResolver, OpenWeatherGeocoder};
pub use icon::{IconCategory, category_of};
pub use model::{CityQuery, Coordinate, CurrentConditions, Forecast, ForecastEntry, MapRegion};
pub use provider::{OpenWeatherClient, WeatherClient};
pub use state::{DisplayState, DisplayStore, ForecastCard, StateUpdate};
pub use widget::{WidgetEntry, WidgetProvider, WidgetTimeline};
