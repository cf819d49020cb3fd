use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use tokio::sync::watch;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, info, warn};

use crate::{
    geolocation::Geolocator,
    icon::classify_icon,
    model::{
        Coordinates, CurrentWeather, FALLBACK_COORDINATES, WeatherQuery, WeatherSnapshot,
        celsius_from_raw, fahrenheit_from_raw, round_half_up,
    },
    notice::{Notice, Notifier},
    provider::WeatherProvider,
    timer::RefreshTimer,
};

/// What happened to a single `fetch_weather` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the snapshot.
    Applied,
    /// No coordinates were known, nothing was requested.
    Skipped,
    /// The request failed; the previous snapshot is kept.
    Failed,
    /// A newer response was already applied, or the controller was deactivated.
    Discarded,
}

/// Build the snapshot that follows `current` once request `request_id` succeeded.
///
/// Returns `None` when a request at least as new has already been applied.
pub fn apply_fetch_result(
    current: &WeatherSnapshot,
    request_id: u64,
    coordinates: Coordinates,
    response: &CurrentWeather,
) -> Option<WeatherSnapshot> {
    if request_id <= current.revision {
        return None;
    }

    let condition = response.condition_main();
    Some(WeatherSnapshot {
        revision: request_id,
        coordinates: Some(coordinates),
        city: Some(response.name.clone()),
        country: response.sys.country.clone(),
        temperature_celsius: Some(celsius_from_raw(response.main.temp)),
        temperature_fahrenheit: Some(fahrenheit_from_raw(response.main.temp)),
        humidity_percent: Some(round_half_up(response.main.humidity)),
        condition_main: Some(condition.to_string()),
        icon: classify_icon(condition),
    })
}

/// Keeps the weather for the user's own location current.
///
/// `activate` looks up the position once (falling back to fixed coordinates
/// when that fails) and starts a periodic refresh against whatever
/// coordinates the snapshot last stored.
#[derive(Debug)]
pub struct LocationWeatherController {
    provider: Arc<dyn WeatherProvider>,
    geolocator: Arc<dyn Geolocator>,
    notifier: Arc<dyn Notifier>,
    fallback: Coordinates,
    state: watch::Sender<WeatherSnapshot>,
    next_request: AtomicU64,
    started: AtomicBool,
    active: CancellationToken,
    tasks: TaskTracker,
}

impl LocationWeatherController {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        geolocator: Arc<dyn Geolocator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(WeatherSnapshot::default());
        Self {
            provider,
            geolocator,
            notifier,
            fallback: FALLBACK_COORDINATES,
            state,
            next_request: AtomicU64::new(0),
            started: AtomicBool::new(false),
            active: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: Coordinates) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherSnapshot> {
        self.state.subscribe()
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_cancelled()
    }

    /// Start the position lookup and the refresh schedule. Only the first call has an effect.
    pub fn activate(self: &Arc<Self>, timer: impl RefreshTimer + 'static) {
        if self.started.swap(true, Ordering::SeqCst) || !self.is_active() {
            debug!("location controller already activated");
            return;
        }

        self.tasks.spawn(Arc::clone(self).locate_and_fetch());
        self.tasks.spawn(Arc::clone(self).refresh_loop(timer));
        self.tasks.close();
    }

    /// Stop the refresh schedule; results still in flight are dropped when they land.
    pub fn deactivate(&self) {
        // Cancelled under the state lock so no write can straddle deactivation.
        self.state.send_if_modified(|_| {
            if !self.active.is_cancelled() {
                debug!("deactivating location controller");
                self.active.cancel();
            }
            false
        });
    }

    /// Deactivate and wait for the background tasks to finish.
    pub async fn shutdown(&self) {
        self.deactivate();
        self.tasks.close();
        self.tasks.wait().await;
    }

    /// Fetch weather for `coordinates` and publish it as the new snapshot.
    ///
    /// Never fails: errors are logged and leave the previous snapshot in place.
    pub async fn fetch_weather(&self, coordinates: Option<Coordinates>) -> FetchOutcome {
        let Some(coordinates) = coordinates else {
            debug!("no coordinates known yet, skipping weather fetch");
            return FetchOutcome::Skipped;
        };
        if !self.is_active() {
            return FetchOutcome::Discarded;
        }

        let request_id = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self
            .provider
            .current_weather(&WeatherQuery::Coordinates(coordinates))
            .await;

        match result {
            Ok(response) => {
                let mut deactivated = false;
                let applied = self.state.send_if_modified(|snapshot| {
                    if !self.is_active() {
                        deactivated = true;
                        return false;
                    }
                    match apply_fetch_result(snapshot, request_id, coordinates, &response) {
                        Some(next) => {
                            *snapshot = next;
                            true
                        }
                        None => false,
                    }
                });

                if deactivated {
                    debug!(request_id, "controller deactivated, dropping weather result");
                    FetchOutcome::Discarded
                } else if applied {
                    info!(
                        request_id,
                        city = %response.name,
                        condition = response.condition_main(),
                        "location weather updated"
                    );
                    FetchOutcome::Applied
                } else {
                    debug!(request_id, "newer weather already applied, dropping stale result");
                    FetchOutcome::Discarded
                }
            }
            Err(_) if !self.is_active() => FetchOutcome::Discarded,
            Err(err) => {
                warn!(request_id, %coordinates, "weather fetch failed, keeping previous snapshot: {err:#}");
                FetchOutcome::Failed
            }
        }
    }

    async fn locate_and_fetch(self: Arc<Self>) {
        if !self.geolocator.is_available() {
            warn!("no geolocation source available");
            self.notifier.notify(Notice::GeolocationUnavailable);
            return;
        }

        let position = tokio::select! {
            biased;
            _ = self.active.cancelled() => return,
            position = self.geolocator.current_position() => position,
        };

        match position {
            Ok(coordinates) => {
                self.fetch_weather(Some(coordinates)).await;
            }
            Err(err) => {
                warn!(fallback = %self.fallback, "could not determine position: {err}");
                self.notifier.notify(Notice::LocationFallback(self.fallback));
                self.fetch_weather(Some(self.fallback)).await;
            }
        }
    }

    async fn refresh_loop(self: Arc<Self>, mut timer: impl RefreshTimer) {
        loop {
            tokio::select! {
                biased;
                _ = self.active.cancelled() => {
                    debug!("location refresh loop stopped");
                    break;
                }
                _ = timer.tick() => {
                    let coordinates = self.state.borrow().coordinates;
                    self.fetch_weather(coordinates).await;
                }
            }
        }
    }
}
