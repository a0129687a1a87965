pub mod app;
pub mod command;
pub mod main_loop;
pub mod registry;

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tokio::sync::Notify;

use crate::config::DaemonConfig;
use crate::daemon::app::App;
use crate::daemon::main_loop::{MainLoopParams, run_main_loop};
use crate::data::SnapshotCell;
use crate::data::calendar::CalendarRefresher;
use crate::data::weather::WeatherRefresher;
use crate::display::{ConsoleDisplay, Display};
use crate::ipc::CommandChannel;
use crate::providers::build_calendar_sources;
use crate::providers::metno::MetnoProvider;
use crate::refresh::{WorkerParams, spawn_refresh_worker};
use crate::screens::ScreenContext;

/// Pause between clearing the display and process exit, letting in-flight
/// panel writes settle.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Listens for SIGINT or SIGTERM signals.
/// When any of these signals is received, it notifies the passed Notify
/// object. Repeated signals only re-notify; the shutdown path runs once.
struct SignalThread {
    signal_thread: Option<std::thread::JoinHandle<()>>,
    signal_handle: signal_hook::iterator::Handle,
}

impl SignalThread {
    fn new(stop_flag: Arc<Notify>) -> Self {
        let mut signals = Signals::new([SIGINT, SIGTERM]).expect("Cannot create signal set");
        let signal_handle = signals.handle();
        let signal_thread = std::thread::spawn(move || {
            for signal in &mut signals {
                log::debug!("Received signal {signal}");
                stop_flag.notify_one();
            }
        });
        Self {
            signal_handle,
            signal_thread: Some(signal_thread),
        }
    }
}

impl Drop for SignalThread {
    fn drop(&mut self) {
        self.signal_handle.close();
        self.signal_thread
            .take()
            .unwrap()
            .join()
            .expect("Signal thread crashed");
    }
}

/// Starts the daemon and runs it until a termination signal arrives.
///
/// Startup order matters: the command socket is bound first (failure is
/// fatal), then the two refresh workers are spawned and kicked for an
/// initial fetch, then the configured screens are loaded. The first screen
/// is shown immediately; data-driven screens fill in as the first fetch
/// cycles publish.
pub async fn run_daemon(config: DaemonConfig) -> anyhow::Result<()> {
    log::info!("Starting paneld {}", crate::PANELD_VERSION);

    let display: Rc<dyn Display> = Rc::new(ConsoleDisplay);
    let channel = CommandChannel::bind(&config.socket_path)?;

    let calendar_cell = SnapshotCell::default();
    let weather_cell = SnapshotCell::default();
    let policy = config.retry.policy();

    let calendar_worker = spawn_refresh_worker(
        CalendarRefresher::new(build_calendar_sources(&config.calendar), policy),
        WorkerParams::production(config.calendar.refresh),
        calendar_cell.clone(),
    );
    let weather_provider = MetnoProvider::new(config.weather.latitude, config.weather.longitude)
        .context("Cannot initialize the weather provider")?;
    let weather_worker = spawn_refresh_worker(
        WeatherRefresher::new(Box::new(weather_provider), policy),
        WorkerParams::production(config.weather.refresh),
        weather_cell.clone(),
    );
    // Fill both snapshots right away instead of waiting a full interval.
    calendar_worker.force_refresh();
    weather_worker.force_refresh();

    let ctx = ScreenContext {
        display: display.clone(),
        calendar: calendar_cell,
        weather: weather_cell,
        calendar_refresh: calendar_worker.trigger(),
        weather_refresh: weather_worker.trigger(),
        weather_city: config.weather.city.clone(),
    };
    let mut app = App::new(ctx, config.page_buttons);
    for name in &config.screens {
        app.add_screen(name);
    }
    anyhow::ensure!(
        !app.is_empty(),
        "none of the configured screens could be loaded"
    );
    app.reload_active();

    let shutdown = Arc::new(Notify::new());
    let _signal_thread = SignalThread::new(shutdown.clone());

    run_main_loop(
        &mut app,
        &channel,
        &shutdown,
        MainLoopParams::production(config.display_refresh),
    )
    .await;

    log::info!("paneld shutting down gracefully...");
    calendar_worker.stop().await;
    weather_worker.stop().await;
    display.clear();
    tokio::time::sleep(SHUTDOWN_GRACE).await;
    drop(channel);
    Ok(())
}
