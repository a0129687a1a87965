use std::time::Duration;

use tokio::sync::Notify;

use crate::daemon::app::App;
use crate::ipc::CommandChannel;

#[derive(Debug, Clone, Copy)]
pub struct MainLoopParams {
    /// Length of one loop iteration.
    pub tick: Duration,
    /// Every this many ticks the active screen is shown even without any
    /// transition, keeping long-idle screens visually current.
    pub display_refresh_ticks: u64,
}

impl MainLoopParams {
    pub fn production(display_refresh: Duration) -> Self {
        MainLoopParams {
            tick: Duration::from_secs(1),
            display_refresh_ticks: display_refresh.as_secs().max(1),
        }
    }
}

/// The daemon's single-threaded scheduler: poll one command, sleep one tick,
/// run the active screen's periodic hook, and periodically force a show.
/// Returns when `shutdown` fires.
pub async fn run_main_loop(
    app: &mut App,
    channel: &CommandChannel,
    shutdown: &Notify,
    params: MainLoopParams,
) {
    let mut loop_time: u64 = 0;
    loop {
        if let Some(message) = channel.poll().await {
            app.dispatch_message(&message);
        }

        tokio::select! {
            _ = tokio::time::sleep(params.tick) => {}
            _ = shutdown.notified() => break,
        }

        app.tick_active();

        if loop_time >= params.display_refresh_ticks {
            loop_time = 0;
        }
        loop_time += 1;
        if loop_time == 1 {
            app.show_active();
        }
    }
    log::debug!("Main loop finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::{FakeScreen, shared_log, test_context};
    use std::sync::Arc;

    #[tokio::test]
    async fn commands_are_applied_and_idle_shows_recur() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("paneld.sock");
        let channel = CommandChannel::bind(&socket).unwrap();

        let (ctx, _display) = test_context();
        let log = shared_log();
        let mut app = App::new(ctx, true);
        app.insert_screen("a", FakeScreen::boxed("a", &log));
        app.insert_screen("b", FakeScreen::boxed("b", &log));

        let shutdown = Arc::new(Notify::new());
        let stopper = shutdown.clone();
        let sender_socket = socket.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            crate::ipc::send_command(&sender_socket, "next").await.unwrap();
            tokio::time::sleep(Duration::from_millis(120)).await;
            stopper.notify_one();
        });

        run_main_loop(
            &mut app,
            &channel,
            &shutdown,
            MainLoopParams {
                tick: Duration::from_millis(10),
                display_refresh_ticks: 4,
            },
        )
        .await;

        assert_eq!(app.active_index(), 1);
        let events = log.borrow();
        // The dispatched transition ran reload-then-show on screen b.
        let reload_at = events.iter().position(|e| e == "reload:b").unwrap();
        assert_eq!(events[reload_at + 1], "show:b");
        // The periodic show fired more than once after the transition.
        let idle_shows = events[reload_at + 2..]
            .iter()
            .filter(|e| *e == "show:b")
            .count();
        assert!(idle_shows >= 2, "saw {idle_shows} idle shows: {events:?}");
        // The active screen's periodic hook ran every tick.
        assert!(events.iter().filter(|e| *e == "tick:b").count() >= 4);
    }

    #[tokio::test]
    async fn shutdown_breaks_the_loop_promptly() {
        let dir = tempfile::tempdir().unwrap();
        let channel = CommandChannel::bind(&dir.path().join("s.sock")).unwrap();
        let (ctx, _display) = test_context();
        let log = shared_log();
        let mut app = App::new(ctx, true);
        app.insert_screen("a", FakeScreen::boxed("a", &log));

        let shutdown = Arc::new(Notify::new());
        shutdown.notify_one();
        // A pre-stored permit must end the very first iteration.
        run_main_loop(
            &mut app,
            &channel,
            &shutdown,
            MainLoopParams {
                tick: Duration::from_secs(3600),
                display_refresh_ticks: 1,
            },
        )
        .await;
    }
}
