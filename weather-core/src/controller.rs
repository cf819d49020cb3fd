//! State owners behind the dashboard panels.
//!
//! Each controller publishes its state through a `tokio::sync::watch`
//! channel and guards every write with an activation token plus a
//! monotonically increasing request id, so a slow response can never
//! overwrite a newer one or touch state after deactivation.

pub mod location;
pub mod search;

pub use location::{FetchOutcome, LocationWeatherController, apply_fetch_result};
pub use search::{CitySearchController, SearchTrigger, apply_search_result};

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::anyhow;
    use async_trait::async_trait;
    use tokio::sync::{mpsc, oneshot};

    use crate::{
        geolocation::{GeolocationError, Geolocator},
        model::{Coordinates, CurrentWeather, WeatherQuery},
        notice::{Notice, Notifier},
        provider::WeatherProvider,
        timer::RefreshTimer,
    };

    pub fn weather(name: &str, country: &str, temp: f64, condition: &str) -> CurrentWeather {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "sys": {"country": country},
            "main": {"temp": temp, "humidity": 70},
            "weather": [{"main": condition, "icon": "10d"}],
            "visibility": 10000,
            "wind": {"speed": 5}
        }))
        .expect("valid fixture")
    }

    struct Scripted {
        gate: Option<oneshot::Receiver<()>>,
        result: Result<CurrentWeather, String>,
    }

    /// Provider answering from a queue of scripted responses.
    #[derive(Default)]
    pub struct ScriptedProvider {
        script: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<WeatherQuery>>,
    }

    impl std::fmt::Debug for ScriptedProvider {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ScriptedProvider").finish_non_exhaustive()
        }
    }

    impl ScriptedProvider {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn respond(&self, result: Result<CurrentWeather, &str>) {
            self.push(None, result);
        }

        /// Queue a response that is held back until the returned sender fires.
        pub fn respond_gated(&self, result: Result<CurrentWeather, &str>) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.push(Some(rx), result);
            tx
        }

        fn push(&self, gate: Option<oneshot::Receiver<()>>, result: Result<CurrentWeather, &str>) {
            self.script.lock().unwrap().push_back(Scripted {
                gate,
                result: result.map_err(str::to_string),
            });
        }

        pub fn calls(&self) -> Vec<WeatherQuery> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn current_weather(&self, query: &WeatherQuery) -> anyhow::Result<CurrentWeather> {
            self.calls.lock().unwrap().push(query.clone());
            let next = self.script.lock().unwrap().pop_front();
            let Some(Scripted { gate, result }) = next else {
                return Err(anyhow!("no scripted response for {query}"));
            };
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            result.map_err(|msg| anyhow!(msg))
        }
    }

    #[derive(Debug)]
    pub enum FakeGeolocator {
        Unavailable,
        Resolves(Coordinates),
        Fails(GeolocationError),
        Hangs,
    }

    #[async_trait]
    impl Geolocator for FakeGeolocator {
        fn is_available(&self) -> bool {
            !matches!(self, FakeGeolocator::Unavailable)
        }

        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            match self {
                FakeGeolocator::Unavailable => Err(GeolocationError::Unavailable),
                FakeGeolocator::Resolves(c) => Ok(*c),
                FakeGeolocator::Fails(err) => Err(err.clone()),
                FakeGeolocator::Hangs => std::future::pending().await,
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        pub fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    /// Timer that ticks only when the test says so.
    pub struct ManualTimer {
        ticks: mpsc::UnboundedReceiver<()>,
    }

    impl ManualTimer {
        pub fn new() -> (mpsc::UnboundedSender<()>, Self) {
            let (tx, ticks) = mpsc::unbounded_channel();
            (tx, Self { ticks })
        }
    }

    #[async_trait]
    impl RefreshTimer for ManualTimer {
        async fn tick(&mut self) {
            if self.ticks.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Yield to spawned tasks until `condition` holds.
    pub async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    /// Give spawned tasks a few scheduler turns.
    pub async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }
}
