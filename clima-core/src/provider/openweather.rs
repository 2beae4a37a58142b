use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE},
    error::{ResolveError, ResolveResult},
    model::{CityQuery, CurrentConditions, DEFAULT_ICON_CODE, Forecast, ForecastEntry},
};

use super::{WeatherClient, check_status};

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    language: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    fn request(&self, path: &str, city: &CityQuery) -> ResolveResult<Request> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, city = %city, "requesting OpenWeather");

        let request = self
            .http
            .get(&url)
            .query(&[
                ("units", "metric"),
                ("lang", self.language.as_str()),
                ("q", city.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .build()?;
        Ok(request)
    }

    async fn get(&self, path: &str, city: &CityQuery) -> ResolveResult<(StatusCode, String)> {
        let request = self.request(path, city)?;
        let res = self.http.execute(request).await?;

        let status = res.status();
        let body = res.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_current(&self, city: &CityQuery) -> ResolveResult<CurrentConditions> {
        let (status, body) = self.get(CURRENT_PATH, city).await?;
        parse_current(status, &body, city)
    }

    async fn fetch_forecast(&self, city: &CityQuery) -> ResolveResult<Forecast> {
        let (status, body) = self.get(FORECAST_PATH, city).await?;
        parse_forecast(status, &body, city)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn icon_of(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.icon.clone())
        .unwrap_or_else(|| DEFAULT_ICON_CODE.to_string())
}

pub(crate) fn parse_current(
    status: StatusCode,
    body: &str,
    city: &CityQuery,
) -> ResolveResult<CurrentConditions> {
    check_status(status, body, city.as_str())?;

    let parsed: OwCurrentResponse = serde_json::from_str(body)?;
    if parsed.main.humidity > 100 {
        return Err(ResolveError::Parse(format!(
            "humidity {}% is outside 0..=100",
            parsed.main.humidity
        )));
    }

    let description = parsed
        .weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_default();

    Ok(CurrentConditions {
        city_label: parsed.name,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        wind_speed_kph: parsed.wind.speed,
        description,
        icon_code: icon_of(&parsed.weather),
    })
}

pub(crate) fn parse_forecast(
    status: StatusCode,
    body: &str,
    city: &CityQuery,
) -> ResolveResult<Forecast> {
    check_status(status, body, city.as_str())?;

    let parsed: OwForecastResponse = serde_json::from_str(body)?;

    Ok(parsed
        .list
        .into_iter()
        .map(|entry| ForecastEntry {
            icon_code: icon_of(&entry.weather),
            timestamp: entry.dt_txt,
            temperature_c: entry.main.temp,
        })
        .collect())
}
