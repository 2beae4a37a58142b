//! In-memory stand-ins for the weather and geocoding services.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    error::{ResolveError, ResolveResult},
    geocode::GeocodeResolver,
    model::{CityQuery, Coordinate, CurrentConditions, Forecast, ForecastEntry},
    provider::WeatherClient,
};

type Scripted<T> = HashMap<String, (Duration, ResolveResult<T>)>;

/// Replies per city after a fixed delay; unknown cities are `NotFound`.
#[derive(Debug, Default)]
pub struct FakeWeather {
    current: Scripted<CurrentConditions>,
    forecast: Scripted<Forecast>,
    calls: Mutex<Vec<String>>,
}

impl FakeWeather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(
        mut self,
        city: &str,
        delay: Duration,
        reply: ResolveResult<CurrentConditions>,
    ) -> Self {
        self.current.insert(city.to_string(), (delay, reply));
        self
    }

    pub fn forecast(mut self, city: &str, delay: Duration, reply: ResolveResult<Forecast>) -> Self {
        self.forecast.insert(city.to_string(), (delay, reply));
        self
    }

    /// `kind:city` for every call, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn reply<T: Clone>(
        &self,
        kind: &str,
        scripted: &Scripted<T>,
        city: &CityQuery,
    ) -> ResolveResult<T> {
        self.calls.lock().unwrap().push(format!("{kind}:{city}"));
        match scripted.get(city.as_str()) {
            Some((delay, reply)) => {
                tokio::time::sleep(*delay).await;
                reply.clone()
            }
            None => Err(ResolveError::NotFound(city.to_string())),
        }
    }
}

#[async_trait]
impl WeatherClient for FakeWeather {
    async fn fetch_current(&self, city: &CityQuery) -> ResolveResult<CurrentConditions> {
        self.reply("current", &self.current, city).await
    }

    async fn fetch_forecast(&self, city: &CityQuery) -> ResolveResult<Forecast> {
        self.reply("forecast", &self.forecast, city).await
    }
}

/// Answers from fixed tables; anything else is `NotFound`. Reverse lookups
/// wait `reverse_delay` first.
#[derive(Debug, Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Coordinate>,
    localities: Vec<(Coordinate, String)>,
    reverse_delay: Duration,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(mut self, city: &str, lat: f64, lon: f64) -> Self {
        let coord = Coordinate::new(lat, lon).expect("valid test coordinate");
        self.places.insert(city.to_string(), coord);
        self
    }

    pub fn locality(mut self, coord: Coordinate, city: &str) -> Self {
        self.localities.push((coord, city.to_string()));
        self
    }

    pub fn reverse_delay(mut self, delay: Duration) -> Self {
        self.reverse_delay = delay;
        self
    }
}

#[async_trait]
impl GeocodeResolver for FakeGeocoder {
    async fn forward(&self, city: &CityQuery) -> ResolveResult<Coordinate> {
        self.places
            .get(city.as_str())
            .copied()
            .ok_or_else(|| ResolveError::NotFound(city.to_string()))
    }

    async fn reverse(&self, coord: Coordinate) -> ResolveResult<CityQuery> {
        tokio::time::sleep(self.reverse_delay).await;
        self.localities
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|(_, name)| CityQuery::new(name.as_str()))
            .unwrap_or_else(|| Err(ResolveError::NotFound(coord.to_string())))
    }
}

pub fn conditions(
    city: &str,
    temp: f64,
    feels_like: f64,
    humidity: u8,
    wind: f64,
) -> CurrentConditions {
    CurrentConditions {
        city_label: city.to_string(),
        temperature_c: temp,
        feels_like_c: feels_like,
        humidity_pct: humidity,
        wind_speed_kph: wind,
        description: "nubes".to_string(),
        icon_code: "03d".to_string(),
    }
}

/// One entry per timestamp, 20.5 °C and a partly-cloudy icon.
pub fn forecast(timestamps: &[&str]) -> Forecast {
    timestamps
        .iter()
        .map(|ts| ForecastEntry {
            timestamp: ts.to_string(),
            temperature_c: 20.5,
            icon_code: "02d".to_string(),
        })
        .collect()
}
