//! Turns triggers (a typed city, a device fix, a map pan) into display state.
//!
//! Every trigger fans out into independent lookups. Each lookup writes its own
//! field of [`DisplayState`](crate::state::DisplayState) as soon as it lands;
//! there is no join across lookups and nothing is ever cancelled. Failures
//! leave the field as it was.

use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    error::ResolveError,
    geocode::GeocodeResolver,
    model::{CityQuery, Coordinate},
    provider::WeatherClient,
    state::{DisplayStore, StateUpdate},
};

/// How results from overlapping triggers are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequencingPolicy {
    /// Whatever lands last wins its field, regardless of when it was issued.
    #[default]
    ArrivalOrder,
    /// Each trigger gets a monotonic generation; a result older than the
    /// newest one already applied to its field is dropped.
    LatestIssued,
}

/// Lookups spawned by one trigger.
///
/// Dropping this detaches the lookups; they still run and apply.
#[derive(Debug, Default)]
pub struct Resolution {
    tasks: Vec<JoinHandle<()>>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits until every lookup of this trigger has applied or been discarded.
    pub async fn settled(self) {
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "resolution task did not complete");
            }
        }
    }
}

/// Sole writer of the [`DisplayStore`] it is built with.
///
/// Clones share the same store and generation counter. Trigger methods spawn
/// onto the current tokio runtime and must be called from inside one.
#[derive(Debug, Clone)]
pub struct ResolutionCoordinator {
    weather: Arc<dyn WeatherClient>,
    geocoder: Arc<dyn GeocodeResolver>,
    store: Arc<DisplayStore>,
    policy: SequencingPolicy,
    default_city: String,
    generation: Arc<AtomicU64>,
}

impl ResolutionCoordinator {
    pub fn new(
        weather: Arc<dyn WeatherClient>,
        geocoder: Arc<dyn GeocodeResolver>,
        store: Arc<DisplayStore>,
    ) -> Self {
        Self {
            weather,
            geocoder,
            store,
            policy: SequencingPolicy::default(),
            default_city: crate::config::DEFAULT_CITY.to_string(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_policy(mut self, policy: SequencingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    pub fn policy(&self) -> SequencingPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<DisplayStore> {
        &self.store
    }

    /// Startup trigger: resolves the configured default city once.
    pub fn start(&self) -> Resolution {
        self.submit_city(&self.default_city)
    }

    /// User-entered or device-detected city name. Blank input is ignored.
    pub fn submit_city(&self, name: &str) -> Resolution {
        match CityQuery::new(name) {
            Ok(city) => self.resolve(city, self.next_generation(), Vec::new()),
            Err(err) => {
                debug!(%err, "ignoring city submission");
                Resolution::default()
            }
        }
    }

    /// The map was dragged to `center`. On a resolvable locality the label and
    /// search box follow it and the city is resolved as if submitted; otherwise
    /// nothing changes.
    ///
    /// Under [`SequencingPolicy::LatestIssued`] the pan counts as issued when
    /// this is called, not when the reverse lookup returns.
    pub fn pan_map(&self, center: Coordinate) -> Resolution {
        self.reverse_then_resolve(center, true)
    }

    /// The device reported a new position.
    pub fn device_located(&self, position: Coordinate) -> Resolution {
        self.reverse_then_resolve(position, false)
    }

    fn reverse_then_resolve(&self, coord: Coordinate, sync_input: bool) -> Resolution {
        let generation = self.next_generation();
        let this = self.clone();
        let task = tokio::spawn(async move {
            match this.geocoder.reverse(coord).await {
                Ok(city) => {
                    let extra = if sync_input {
                        vec![StateUpdate::Input(city.to_string())]
                    } else {
                        Vec::new()
                    };
                    this.resolve(city, generation, extra).settled().await;
                }
                Err(err) => discard("reverse geocode", &coord.to_string(), &err),
            }
        });
        Resolution { tasks: vec![task] }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn resolve(&self, city: CityQuery, generation: u64, mut eager: Vec<StateUpdate>) -> Resolution {
        debug!(%city, generation, "resolving city");

        eager.insert(0, StateUpdate::CityLabel(city.to_string()));
        self.commit(generation, eager);

        let current = {
            let this = self.clone();
            let city = city.clone();
            tokio::spawn(async move {
                match this.weather.fetch_current(&city).await {
                    Ok(conditions) => this.commit(
                        generation,
                        vec![
                            StateUpdate::CityLabel(conditions.city_label.clone()),
                            StateUpdate::Current(conditions),
                        ],
                    ),
                    Err(err) => discard("current weather", city.as_str(), &err),
                }
            })
        };

        let forecast = {
            let this = self.clone();
            let city = city.clone();
            tokio::spawn(async move {
                match this.weather.fetch_forecast(&city).await {
                    Ok(forecast) => this.commit(generation, vec![StateUpdate::Forecast(forecast)]),
                    Err(err) => discard("forecast", city.as_str(), &err),
                }
            })
        };

        let location = {
            let this = self.clone();
            tokio::spawn(async move {
                match this.geocoder.forward(&city).await {
                    Ok(center) => this.commit(generation, vec![StateUpdate::Center(center)]),
                    Err(err) => discard("forward geocode", city.as_str(), &err),
                }
            })
        };

        Resolution { tasks: vec![current, forecast, location] }
    }

    fn commit(&self, generation: u64, updates: Vec<StateUpdate>) {
        match self.policy {
            SequencingPolicy::ArrivalOrder => self.store.apply_all(updates),
            SequencingPolicy::LatestIssued => self.store.apply_stamped(generation, updates),
        };
    }
}

fn discard(what: &str, subject: &str, err: &ResolveError) {
    match err {
        ResolveError::NotFound(_) => debug!(what, subject, %err, "lookup found nothing"),
        _ => warn!(what, subject, %err, "lookup failed; keeping previous value"),
    }
}
