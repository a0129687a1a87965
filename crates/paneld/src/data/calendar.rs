use chrono::{DateTime, Local, NaiveDate};
use futures::future::{BoxFuture, join_all};

use crate::common::error::FetchError;
use crate::refresh::Refresher;
use crate::refresh::backoff::{RetryPolicy, retry_with_backoff};

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub start: DateTime<Local>,
    pub end: Option<DateTime<Local>>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub due: Option<DateTime<Local>>,
    pub summary: String,
}

/// Everything one fetch of one calendar connection yielded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarBatch {
    pub events: Vec<Event>,
    pub tasks: Vec<Task>,
}

/// Immutable published view of all configured calendars: upcoming events
/// sorted by start, tasks sorted by due date with undated tasks last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarSnapshot {
    pub events: Vec<Event>,
    pub tasks: Vec<Task>,
}

impl CalendarSnapshot {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.tasks.is_empty()
    }
}

/// One calendar connection (a webcal feed, a CalDAV account, ...).
pub trait CalendarSource: Send + Sync {
    fn label(&self) -> &str;
    fn fetch(&self) -> BoxFuture<'_, Result<CalendarBatch, FetchError>>;
}

/// Aggregating fetch cycle over all configured calendar sources.
///
/// Sources are fetched concurrently, each behind its own retry/backoff. A
/// failing source is logged and skipped; the cycle publishes whatever subset
/// succeeded. Only when every source failed does the cycle itself fail, so
/// that the previously published snapshot stays in place.
pub struct CalendarRefresher {
    sources: Vec<Box<dyn CalendarSource>>,
    policy: RetryPolicy,
}

impl CalendarRefresher {
    pub fn new(sources: Vec<Box<dyn CalendarSource>>, policy: RetryPolicy) -> Self {
        CalendarRefresher { sources, policy }
    }
}

impl Refresher for CalendarRefresher {
    type Snapshot = CalendarSnapshot;

    fn label(&self) -> &'static str {
        "calendar"
    }

    fn run_cycle(&mut self) -> BoxFuture<'_, Result<CalendarSnapshot, FetchError>> {
        Box::pin(async move {
            log::debug!("Started reading calendars...");
            let policy = self.policy;
            let fetches = self.sources.iter().map(|source| async move {
                let outcome = retry_with_backoff(
                    &policy,
                    source.label(),
                    || source.fetch(),
                    FetchError::is_retryable,
                )
                .await;
                (source.label().to_string(), outcome)
            });

            let mut events = Vec::new();
            let mut tasks = Vec::new();
            let mut failed = 0usize;
            for (label, outcome) in join_all(fetches).await {
                match outcome {
                    Ok(batch) => {
                        events.extend(batch.events);
                        tasks.extend(batch.tasks);
                    }
                    Err(error) => {
                        failed += 1;
                        log::error!("Failed to fetch calendar \"{label}\": {error}");
                    }
                }
            }
            if failed > 0 && failed == self.sources.len() {
                return Err(FetchError::AllSourcesFailed(failed));
            }
            Ok(build_snapshot(events, tasks, Local::now().date_naive()))
        })
    }
}

/// Keeps today-and-future events, sorted by start; tasks by due date with
/// undated tasks at the end.
fn build_snapshot(
    mut events: Vec<Event>,
    mut tasks: Vec<Task>,
    today: NaiveDate,
) -> CalendarSnapshot {
    events.retain(|event| event.start.date_naive() >= today);
    events.sort_by_key(|event| event.start);
    tasks.sort_by_key(|task| (task.due.is_none(), task.due));
    CalendarSnapshot { events, tasks }
}

/// Human-readable rendition of an event timestamp relative to `now`.
pub fn humanized_datetime(dt: &DateTime<Local>, now: &DateTime<Local>) -> String {
    let date = dt.date_naive();
    let today = now.date_naive();
    if date == today {
        format!("today {}", dt.format("%H:%M"))
    } else if Some(date) == today.succ_opt() {
        format!("tomorrow {}", dt.format("%H:%M"))
    } else {
        dt.format("%a %b %d").to_string()
    }
}
