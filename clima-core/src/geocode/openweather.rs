use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::DEFAULT_BASE_URL,
    error::{ResolveError, ResolveResult},
    model::{CityQuery, Coordinate},
    provider::check_status,
};

use super::GeocodeResolver;

const DIRECT_PATH: &str = "/geo/1.0/direct";
const REVERSE_PATH: &str = "/geo/1.0/reverse";

/// Geocoder backed by the OpenWeather geocoding API.
#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    #[serde(default)]
    name: String,
    lat: f64,
    lon: f64,
}

impl OpenWeatherGeocoder {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request(&self, path: &str, query: &[(&str, String)]) -> ResolveResult<Request> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "requesting geocoder");

        let request = self
            .http
            .get(&url)
            .query(query)
            .query(&[("limit", "1"), ("appid", self.api_key.as_str())])
            .build()?;
        Ok(request)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> ResolveResult<(StatusCode, String)> {
        let request = self.request(path, query)?;
        let res = self.http.execute(request).await?;

        let status = res.status();
        let body = res.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl GeocodeResolver for OpenWeatherGeocoder {
    async fn forward(&self, city: &CityQuery) -> ResolveResult<Coordinate> {
        let (status, body) = self.get(DIRECT_PATH, &[("q", city.to_string())]).await?;
        parse_forward(status, &body, city)
    }

    async fn reverse(&self, coord: Coordinate) -> ResolveResult<CityQuery> {
        let (status, body) = self
            .get(
                REVERSE_PATH,
                &[("lat", coord.lat().to_string()), ("lon", coord.lon().to_string())],
            )
            .await?;
        parse_reverse(status, &body, coord)
    }
}

fn first_place(body: &str) -> ResolveResult<Option<OwPlace>> {
    let places: Vec<OwPlace> = serde_json::from_str(body)?;
    Ok(places.into_iter().next())
}

pub(crate) fn parse_forward(
    status: StatusCode,
    body: &str,
    city: &CityQuery,
) -> ResolveResult<Coordinate> {
    check_status(status, body, city.as_str())?;

    let place = first_place(body)?.ok_or_else(|| ResolveError::NotFound(city.to_string()))?;
    Coordinate::new(place.lat, place.lon)
        .map_err(|e| ResolveError::Parse(format!("geocoder returned {e}")))
}

pub(crate) fn parse_reverse(
    status: StatusCode,
    body: &str,
    coord: Coordinate,
) -> ResolveResult<CityQuery> {
    let subject = coord.to_string();
    check_status(status, body, &subject)?;

    let place = first_place(body)?.ok_or_else(|| ResolveError::NotFound(subject.clone()))?;
    CityQuery::new(place.name).map_err(|_| ResolveError::NotFound(subject))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_uses_first_candidate() {
        let body = r#"[
            {"name": "Lima", "lat": -12.0621, "lon": -77.0365, "country": "PE"},
            {"name": "Lima", "lat": 40.7426, "lon": -84.1052, "country": "US", "state": "Ohio"}
        ]"#;
        let city = CityQuery::new("Lima").unwrap();
        let coord = parse_forward(StatusCode::OK, body, &city).unwrap();
        assert_eq!(coord.lat(), -12.0621);
        assert_eq!(coord.lon(), -77.0365);
    }

    #[test]
    fn forward_with_no_candidates_is_not_found() {
        let city = CityQuery::new("Atlantis").unwrap();
        let err = parse_forward(StatusCode::OK, "[]", &city).unwrap_err();
        assert_eq!(err, ResolveError::NotFound("Atlantis".into()));
    }

    #[test]
    fn forward_out_of_range_coordinate_is_parse_error() {
        let city = CityQuery::new("Nowhere").unwrap();
        let body = r#"[{"name": "Nowhere", "lat": 123.0, "lon": 0.0}]"#;
        let err = parse_forward(StatusCode::OK, body, &city).unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }

    #[test]
    fn reverse_returns_locality_name() {
        let body = r#"[{"name": "Cusco", "lat": -13.53, "lon": -71.96, "country": "PE"}]"#;
        let coord = Coordinate::new(-13.5, -71.9).unwrap();
        let city = parse_reverse(StatusCode::OK, body, coord).unwrap();
        assert_eq!(city.as_str(), "Cusco");
    }

    #[test]
    fn reverse_over_open_ocean_is_not_found() {
        let coord = Coordinate::new(-30.0, -120.0).unwrap();
        assert!(parse_reverse(StatusCode::OK, "[]", coord).unwrap_err().is_not_found());

        let nameless = r#"[{"name": "", "lat": -30.0, "lon": -120.0}]"#;
        assert!(parse_reverse(StatusCode::OK, nameless, coord).unwrap_err().is_not_found());
    }

    fn query_of(request: &Request) -> Vec<(String, String)> {
        request.url().query_pairs().into_owned().collect()
    }

    #[test]
    fn lookups_ask_for_a_single_candidate() {
        let geocoder = OpenWeatherGeocoder::new("KEY".into()).with_base_url("http://localhost:9/".into());

        let direct = geocoder.request(DIRECT_PATH, &[("q", "Lima".to_string())]).unwrap();
        assert_eq!(direct.url().path(), DIRECT_PATH);
        assert_eq!(
            query_of(&direct),
            vec![
                ("q".to_string(), "Lima".to_string()),
                ("limit".to_string(), "1".to_string()),
                ("appid".to_string(), "KEY".to_string()),
            ]
        );

        let reverse = geocoder
            .request(REVERSE_PATH, &[("lat", "-13.5".to_string()), ("lon", "-71.9".to_string())])
            .unwrap();
        assert_eq!(reverse.url().path(), REVERSE_PATH);
        let query = query_of(&reverse);
        assert!(query.contains(&("lat".to_string(), "-13.5".to_string())));
        assert!(query.contains(&("lon".to_string(), "-71.9".to_string())));
        assert!(query.contains(&("limit".to_string(), "1".to_string())));
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let coord = Coordinate::origin();
        let err = parse_reverse(StatusCode::OK, r#"{"cod": 400}"#, coord).unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }
}
