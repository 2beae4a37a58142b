//! Observable display snapshot and its single serialized write path.
//!
//! Readers hold a [`watch::Receiver`] and see every committed change; all
//! writes go through [`DisplayStore`], which applies each batch atomically.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;
use tracing::debug;

use crate::{
    format,
    icon::{IconCategory, category_of},
    model::{Coordinate, CurrentConditions, DEFAULT_ICON_CODE, Forecast, MapRegion},
};

/// City label shown before any lookup has landed.
pub const PLACEHOLDER_CITY_LABEL: &str = "Detectando...";

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Search box text.
    pub input: String,
    pub city_label: String,
    pub current: Option<CurrentConditions>,
    pub forecast: Forecast,
    pub region: MapRegion,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            input: String::new(),
            city_label: PLACEHOLDER_CITY_LABEL.to_string(),
            current: None,
            forecast: Vec::new(),
            region: MapRegion::default(),
        }
    }
}

impl DisplayState {
    pub fn temperature(&self) -> String {
        self.current
            .as_ref()
            .map_or_else(|| "--°C".to_string(), |c| format::temperature(c.temperature_c))
    }

    pub fn feels_like(&self) -> String {
        self.current
            .as_ref()
            .map_or_else(|| "--°C".to_string(), |c| format::temperature(c.feels_like_c))
    }

    pub fn humidity(&self) -> String {
        self.current
            .as_ref()
            .map_or_else(|| "--%".to_string(), |c| format::humidity(c.humidity_pct))
    }

    pub fn wind_speed(&self) -> String {
        self.current
            .as_ref()
            .map_or_else(|| "-- km/h".to_string(), |c| format::wind_speed(c.wind_speed_kph))
    }

    pub fn icon_code(&self) -> &str {
        self.current.as_ref().map_or(DEFAULT_ICON_CODE, |c| c.icon_code.as_str())
    }

    pub fn icon_category(&self) -> IconCategory {
        category_of(self.icon_code())
    }

    pub fn forecast_cards(&self) -> Vec<ForecastCard> {
        self.forecast
            .iter()
            .map(|entry| ForecastCard {
                label: format::forecast_label(&entry.timestamp),
                temperature: format::temperature(entry.temperature_c),
                category: entry.icon_category(),
            })
            .collect()
    }
}

/// One rendered forecast slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCard {
    pub label: String,
    pub temperature: String,
    pub category: IconCategory,
}

/// A write to exactly one field of [`DisplayState`].
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    CityLabel(String),
    Input(String),
    Current(CurrentConditions),
    Forecast(Forecast),
    /// Recenters the map; the span is left alone.
    Center(Coordinate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    CityLabel,
    Input,
    Current,
    Forecast,
    Region,
}

impl StateUpdate {
    fn field(&self) -> Field {
        match self {
            StateUpdate::CityLabel(_) => Field::CityLabel,
            StateUpdate::Input(_) => Field::Input,
            StateUpdate::Current(_) => Field::Current,
            StateUpdate::Forecast(_) => Field::Forecast,
            StateUpdate::Center(_) => Field::Region,
        }
    }

    /// Returns whether the state actually changed.
    fn apply_to(self, state: &mut DisplayState) -> bool {
        match self {
            StateUpdate::CityLabel(label) => replace(&mut state.city_label, label),
            StateUpdate::Input(input) => replace(&mut state.input, input),
            StateUpdate::Current(current) => replace(&mut state.current, Some(current)),
            StateUpdate::Forecast(forecast) => replace(&mut state.forecast, forecast),
            StateUpdate::Center(center) => {
                let region = MapRegion { center, ..state.region };
                replace(&mut state.region, region)
            }
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Owner of the display snapshot.
///
/// Batches are committed under one lock, so readers never observe a
/// half-applied batch. Which batch wins a field is decided by commit order,
/// or by generation when committed through [`DisplayStore::apply_stamped`].
#[derive(Debug)]
pub struct DisplayStore {
    tx: watch::Sender<DisplayState>,
    generations: Mutex<HashMap<Field, u64>>,
}

impl Default for DisplayStore {
    fn default() -> Self {
        Self::new(DisplayState::default())
    }
}

impl DisplayStore {
    pub fn new(initial: DisplayState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, generations: Mutex::new(HashMap::new()) }
    }

    pub fn snapshot(&self) -> DisplayState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.tx.subscribe()
    }

    pub fn apply(&self, update: StateUpdate) -> bool {
        self.commit(None, [update])
    }

    pub fn apply_all(&self, updates: impl IntoIterator<Item = StateUpdate>) -> bool {
        self.commit(None, updates)
    }

    /// Like [`apply_all`](Self::apply_all), but each write is dropped when its
    /// field already holds a value from a newer generation.
    pub fn apply_stamped(
        &self,
        generation: u64,
        updates: impl IntoIterator<Item = StateUpdate>,
    ) -> bool {
        self.commit(Some(generation), updates)
    }

    fn commit(
        &self,
        generation: Option<u64>,
        updates: impl IntoIterator<Item = StateUpdate>,
    ) -> bool {
        let mut generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);

        self.tx.send_if_modified(|state| {
            let mut modified = false;
            for update in updates {
                if let Some(generation) = generation {
                    let last = generations.entry(update.field()).or_insert(0);
                    if generation < *last {
                        debug!(?update, generation, newest = *last, "dropping stale update");
                        continue;
                    }
                    *last = generation;
                }
                modified |= update.apply_to(state);
            }
            modified
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(city: &str, temp: f64) -> CurrentConditions {
        CurrentConditions {
            city_label: city.to_string(),
            temperature_c: temp,
            feels_like_c: temp - 1.0,
            humidity_pct: 70,
            wind_speed_kph: 10.0,
            description: String::new(),
            icon_code: "10n".to_string(),
        }
    }

    #[test]
    fn placeholders_before_any_data() {
        let state = DisplayState::default();
        assert_eq!(state.city_label, "Detectando...");
        assert_eq!(state.temperature(), "--°C");
        assert_eq!(state.feels_like(), "--°C");
        assert_eq!(state.humidity(), "--%");
        assert_eq!(state.wind_speed(), "-- km/h");
        assert_eq!(state.icon_code(), "01d");
        assert_eq!(state.icon_category(), IconCategory::ClearDay);
        assert!(state.forecast_cards().is_empty());
    }

    #[test]
    fn rendered_fields_follow_current_conditions() {
        let store = DisplayStore::default();
        store.apply(StateUpdate::Current(conditions("Lima", 22.7)));

        let state = store.snapshot();
        assert_eq!(state.temperature(), "22°C");
        assert_eq!(state.feels_like(), "21°C");
        assert_eq!(state.humidity(), "70%");
        assert_eq!(state.wind_speed(), "10 km/h");
        assert_eq!(state.icon_category(), IconCategory::Rain);
    }

    #[test]
    fn center_update_keeps_span() {
        let store = DisplayStore::default();
        let center = Coordinate::new(-12.05, -77.04).unwrap();
        store.apply(StateUpdate::Center(center));

        let region = store.snapshot().region;
        assert_eq!(region.center, center);
        assert_eq!(region.span_degrees, 0.5);
    }

    #[test]
    fn forecast_cards_render_each_entry() {
        let store = DisplayStore::default();
        store.apply(StateUpdate::Forecast(vec![
            crate::model::ForecastEntry {
                timestamp: "2025-02-20 15:00:00".into(),
                temperature_c: 24.9,
                icon_code: "02d".into(),
            },
            crate::model::ForecastEntry {
                timestamp: "garbled".into(),
                temperature_c: 19.2,
                icon_code: "zz".into(),
            },
        ]));

        let cards = store.snapshot().forecast_cards();
        assert_eq!(
            cards,
            vec![
                ForecastCard {
                    label: "Thu 15:00".into(),
                    temperature: "24°C".into(),
                    category: IconCategory::PartlyCloudy,
                },
                ForecastCard {
                    label: "garbled".into(),
                    temperature: "19°C".into(),
                    category: IconCategory::Overcast,
                },
            ]
        );
    }

    #[tokio::test]
    async fn subscribers_are_notified_on_change_only() {
        let store = DisplayStore::default();
        let mut rx = store.subscribe();

        assert!(store.apply(StateUpdate::CityLabel("Lima".into())));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().city_label, "Lima");

        assert!(!store.apply(StateUpdate::CityLabel("Lima".into())));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn batch_is_applied_together() {
        let store = DisplayStore::default();
        let mut rx = store.subscribe();

        store.apply_all([
            StateUpdate::CityLabel("Cusco".into()),
            StateUpdate::Input("Cusco".into()),
        ]);

        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.city_label, "Cusco");
        assert_eq!(seen.input, "Cusco");
    }

    #[test]
    fn stamped_updates_drop_older_generations_per_field() {
        let store = DisplayStore::default();

        store.apply_stamped(2, [StateUpdate::Current(conditions("Cusco", 12.0))]);
        let changed = store.apply_stamped(1, [
            StateUpdate::Current(conditions("Lima", 22.0)),
            StateUpdate::Forecast(Vec::new()),
            StateUpdate::CityLabel("Lima".into()),
        ]);

        // Forecast was already empty; only the label changed.
        assert!(changed);
        let state = store.snapshot();
        assert_eq!(state.current.unwrap().city_label, "Cusco");
        assert_eq!(state.city_label, "Lima");
    }

    #[test]
    fn unstamped_updates_use_arrival_order() {
        let store = DisplayStore::default();
        store.apply(StateUpdate::Current(conditions("Cusco", 12.0)));
        store.apply(StateUpdate::Current(conditions("Lima", 22.0)));
        assert_eq!(store.snapshot().current.unwrap().city_label, "Lima");
    }
}
