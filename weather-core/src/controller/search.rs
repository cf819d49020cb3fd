use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use tokio::{sync::watch, task::JoinHandle};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, info};

use crate::{
    config::DEFAULT_CITY,
    model::{CurrentWeather, SearchError, SearchOutcome, SearchState, WeatherQuery},
    provider::WeatherProvider,
};

/// What started a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTrigger {
    /// Search this city name.
    City(String),
    /// Search whatever is currently typed into the query box.
    Submit,
}

/// Build the state that follows `current` once search `request_id` for `query` settled.
///
/// A successful search replaces the outcome with the response, a failed one
/// with a "Not Found" error naming `query`; either way the typed query is
/// cleared. Returns `None` when a newer search has already settled.
pub fn apply_search_result(
    current: &SearchState,
    request_id: u64,
    query: &str,
    result: anyhow::Result<CurrentWeather>,
) -> Option<SearchState> {
    if request_id <= current.revision {
        return None;
    }

    let outcome = match result {
        Ok(weather) => SearchOutcome::Found(weather),
        Err(_) => SearchOutcome::NotFound(SearchError::not_found(query)),
    };

    Some(SearchState {
        revision: request_id,
        query_text: String::new(),
        outcome: Some(outcome),
    })
}

/// Looks up weather for free-text city names, independent of the location panel.
#[derive(Debug)]
pub struct CitySearchController {
    provider: Arc<dyn WeatherProvider>,
    default_city: String,
    state: watch::Sender<SearchState>,
    next_request: AtomicU64,
    started: AtomicBool,
    active: CancellationToken,
    tasks: TaskTracker,
}

impl CitySearchController {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            provider,
            default_city: DEFAULT_CITY.to_string(),
            state,
            next_request: AtomicU64::new(0),
            started: AtomicBool::new(false),
            active: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_cancelled()
    }

    /// Issue the initial search for the default city. Only the first call has an effect.
    pub fn activate(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) || !self.is_active() {
            return;
        }

        let this = Arc::clone(self);
        self.tasks.spawn(async move {
            let city = this.default_city.clone();
            this.search(SearchTrigger::City(city)).await;
        });
    }

    pub fn deactivate(&self) {
        // Cancelled under the state lock so no write can straddle deactivation.
        self.state.send_if_modified(|_| {
            self.active.cancel();
            false
        });
    }

    /// Deactivate and wait for the initial search task to finish.
    pub async fn shutdown(&self) {
        self.deactivate();
        self.tasks.close();
        self.tasks.wait().await;
    }

    pub fn set_query_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|state| state.query_text = text);
    }

    /// Search the text typed so far, in the background.
    ///
    /// The query is read before this returns, so typing on (or a later
    /// submit) cannot change what this search asks for.
    pub fn submit_query(self: &Arc<Self>) -> JoinHandle<Option<SearchOutcome>> {
        let query = self.state.borrow().query_text.clone();
        let this = Arc::clone(self);
        self.tasks
            .spawn(async move { this.search(SearchTrigger::City(query)).await })
    }

    /// Run a search and store its outcome.
    ///
    /// Returns the stored outcome, or `None` if the result was dropped because
    /// the controller was deactivated or a newer search settled first.
    pub async fn search(&self, trigger: SearchTrigger) -> Option<SearchOutcome> {
        if !self.is_active() {
            return None;
        }

        let query = match trigger {
            SearchTrigger::City(name) => name,
            SearchTrigger::Submit => self.state.borrow().query_text.clone(),
        };
        let request_id = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self
            .provider
            .current_weather(&WeatherQuery::City(query.clone()))
            .await;

        match &result {
            Ok(weather) => info!(request_id, %query, city = %weather.name, "city search succeeded"),
            Err(err) => info!(request_id, %query, "city search failed: {err:#}"),
        }

        let mut stored = None;
        let mut deactivated = false;
        self.state.send_if_modified(|state| {
            if !self.is_active() {
                deactivated = true;
                return false;
            }
            match apply_search_result(state, request_id, &query, result) {
                Some(next) => {
                    stored = next.outcome.clone();
                    *state = next;
                    true
                }
                None => false,
            }
        });

        if deactivated {
            debug!(request_id, "search controller deactivated, dropping result");
        } else if stored.is_none() {
            debug!(request_id, "newer search already settled, dropping stale result");
        }
        stored
    }
}
