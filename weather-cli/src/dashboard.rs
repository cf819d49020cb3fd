use std::{
    io::{self, BufRead, Write},
    sync::Arc,
    thread,
    time::Duration,
};

use chrono::Local;
use tokio::sync::mpsc;
use weather_core::{
    CitySearchController, Config, Coordinates, Geolocator, IntervalTimer,
    LocationWeatherController, Notice, Notifier, SearchState, WeatherSnapshot,
    geolocation::{DisabledGeolocator, FixedGeolocator, geolocator_from_config},
    provider::provider_from_config,
    render::Dashboard,
};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardOptions {
    pub position: Option<Coordinates>,
    pub no_geolocation: bool,
}

/// Prints notices to stderr, where they survive the next redraw of stdout.
#[derive(Debug, Default)]
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_fatal() {
            eprintln!("error: {notice}");
        } else {
            eprintln!("notice: {notice}");
        }
    }
}

fn geolocator_for(
    config: &Config,
    options: DashboardOptions,
) -> anyhow::Result<Arc<dyn Geolocator>> {
    if options.no_geolocation {
        return Ok(Arc::new(DisabledGeolocator));
    }
    match options.position {
        Some(position) => Ok(Arc::new(FixedGeolocator::new(position))),
        None => geolocator_from_config(&config.geolocation),
    }
}

/// Run both controllers until Ctrl-C or end of input, redrawing on every change and every second.
///
/// Each line read from stdin becomes the query text and is submitted as a search.
pub async fn run(config: &Config, options: DashboardOptions) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let geolocator = geolocator_for(config, options)?;

    let location = Arc::new(
        LocationWeatherController::new(provider.clone(), geolocator, Arc::new(TerminalNotifier))
            .with_fallback(config.fallback),
    );
    let search =
        Arc::new(CitySearchController::new(provider).with_default_city(config.default_city.clone()));

    let mut snapshots = location.subscribe();
    let mut results = search.subscribe();

    location.activate(IntervalTimer::new(config.refresh_interval()));
    search.activate();
    tracing::info!(
        refresh_secs = config.refresh_interval().as_secs(),
        "dashboard started"
    );

    let mut clock = tokio::time::interval(Duration::from_secs(1));
    let mut queries = spawn_stdin_reader();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = clock.tick() => {}
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = queries.recv() => match line {
                Some(text) => {
                    search.set_query_text(text);
                    search.submit_query();
                }
                None => break,
            },
        }

        let snapshot = snapshots.borrow_and_update().clone();
        let state = results.borrow_and_update().clone();
        draw(&snapshot, &state)?;
    }

    location.shutdown().await;
    search.shutdown().await;
    tracing::info!("dashboard stopped");
    Ok(())
}

/// Blocking stdin reads live on their own thread so they never hold up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn draw(snapshot: &WeatherSnapshot, search: &SearchState) -> io::Result<()> {
    let dashboard = Dashboard {
        snapshot,
        search,
        now: Local::now().naive_local(),
    };

    let mut out = io::stdout().lock();
    write!(out, "{CLEAR_SCREEN}{dashboard}")?;
    out.flush()
}
