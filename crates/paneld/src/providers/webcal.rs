//! Calendar source for webcal/ICS feeds fetched over HTTP.
//!
//! The parser below covers the subset of RFC 5545 these feeds actually use:
//! folded lines, VEVENT with DTSTART/DTEND/SUMMARY, VTODO with DUE/SUMMARY,
//! date and date-time values with an optional UTC marker. Anything else is
//! ignored.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use futures::future::BoxFuture;

use crate::common::error::FetchError;
use crate::data::calendar::{CalendarBatch, CalendarSource, Event, Task};

/// How far ahead events are collected, matching the snapshot horizon shown
/// on the calendar screen.
const LOOKAHEAD_DAYS: i64 = 14;
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct WebcalSource {
    url: String,
    client: reqwest::Client,
}

impl WebcalSource {
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("paneld/", env!("CARGO_PKG_VERSION")))
            .build()?;
        // A webcal URL is plain HTTPS underneath.
        let url = match url.strip_prefix("webcal://") {
            Some(rest) => format!("https://{rest}"),
            None => url.to_string(),
        };
        Ok(WebcalSource { url, client })
    }
}

impl CalendarSource for WebcalSource {
    fn label(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> BoxFuture<'_, Result<CalendarBatch, FetchError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await?
                .error_for_status()?;
            let body = response.text().await?;
            let mut batch = parse_ics(&body)?;
            let horizon = Local::now() + chrono::Duration::days(LOOKAHEAD_DAYS);
            batch.events.retain(|event| event.start <= horizon);
            Ok(batch)
        })
    }
}

#[derive(Default)]
struct Component {
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    due: Option<DateTime<Local>>,
    summary: Option<String>,
}

pub(crate) fn parse_ics(text: &str) -> Result<CalendarBatch, FetchError> {
    if !text.contains("BEGIN:VCALENDAR") {
        return Err(FetchError::Malformed("payload is not an ICS calendar".into()));
    }

    let mut batch = CalendarBatch::default();
    // (is_event, component under construction)
    let mut current: Option<(bool, Component)> = None;

    for line in unfold_lines(text) {
        match line.as_str() {
            "BEGIN:VEVENT" => current = Some((true, Component::default())),
            "BEGIN:VTODO" => current = Some((false, Component::default())),
            "END:VEVENT" => {
                if let Some((true, component)) = current.take() {
                    if let Some(start) = component.start {
                        batch.events.push(Event {
                            start,
                            end: component.end,
                            summary: component.summary.unwrap_or_default(),
                        });
                    }
                }
            }
            "END:VTODO" => {
                if let Some((false, component)) = current.take() {
                    batch.tasks.push(Task {
                        due: component.due,
                        summary: component.summary.unwrap_or_default(),
                    });
                }
            }
            _ => {
                let Some((_, component)) = current.as_mut() else {
                    continue;
                };
                let Some((name, value)) = line.split_once(':') else {
                    continue;
                };
                // Property parameters (";TZID=...", ";VALUE=DATE") are not
                // interpreted; values without a zone are taken as local time.
                let name = name.split(';').next().unwrap_or(name);
                match name {
                    "DTSTART" => component.start = parse_ics_datetime(value),
                    "DTEND" => component.end = parse_ics_datetime(value),
                    "DUE" => component.due = parse_ics_datetime(value),
                    "SUMMARY" => component.summary = Some(unescape(value)),
                    _ => {}
                }
            }
        }
    }
    Ok(batch)
}

/// Joins RFC 5545 folded lines (continuations start with a space or tab)
/// and strips carriage returns.
fn unfold_lines(text: &str) -> Vec<String> {
    let mut unfolded: Vec<String> = Vec::new();
    for raw in text.lines() {
        let line = raw.trim_end_matches('\r');
        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some(last) = unfolded.last_mut() {
                last.push_str(continuation);
                continue;
            }
        }
        unfolded.push(line.to_string());
    }
    unfolded
}

fn parse_ics_datetime(raw: &str) -> Option<DateTime<Local>> {
    let trimmed = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed.trim_end_matches('Z'), "%Y%m%dT%H%M%S") {
        if trimmed.ends_with('Z') {
            Some(Utc.from_utc_datetime(&dt).with_timezone(&Local))
        } else {
            Local.from_local_datetime(&dt).earliest()
        }
    } else if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y%m%d") {
        // All-day entries become local midnight.
        Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()
    } else {
        None
    }
}

fn unescape(value: &str) -> String {
    value
        .replace("\\n", " ")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
DTSTART;TZID=Europe/Rome:20260810T100000\r\n\
DTEND;TZID=Europe/Rome:20260810T110000\r\n\
SUMMARY:Team sync\\, weekly\r\n\
BEGIN:VALARM\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTSTART;VALUE=DATE:20260812\r\n\
SUMMARY:Ferragosto prep with a very long\r\n\
 \u{20}folded description\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
DUE:20260811T090000\r\n\
SUMMARY:Water the plants\r\n\
END:VTODO\r\n\
BEGIN:VTODO\r\n\
SUMMARY:Someday task\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn parses_events_and_tasks() {
        let batch = parse_ics(FEED).unwrap();

        assert_eq!(batch.events.len(), 2);
        let sync = &batch.events[0];
        assert_eq!(sync.summary, "Team sync, weekly");
        assert_eq!(sync.start.hour(), 10);
        assert!(sync.end.is_some());

        let all_day = &batch.events[1];
        assert!(all_day.summary.starts_with("Ferragosto prep"));
        assert!(all_day.summary.ends_with("folded description"));
        assert_eq!(all_day.start.hour(), 0);

        assert_eq!(batch.tasks.len(), 2);
        assert!(batch.tasks[0].due.is_some());
        assert_eq!(batch.tasks[1].summary, "Someday task");
        assert!(batch.tasks[1].due.is_none());
    }

    #[test]
    fn event_without_start_is_dropped() {
        let feed = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:floating\nEND:VEVENT\nEND:VCALENDAR\n";
        let batch = parse_ics(feed).unwrap();
        assert!(batch.events.is_empty());
    }

    #[test]
    fn non_ics_payload_is_malformed() {
        assert!(matches!(
            parse_ics("<html>captive portal</html>"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn utc_marker_is_honored() {
        let parsed = parse_ics_datetime("20260810T120000Z").unwrap();
        assert_eq!(parsed.with_timezone(&Utc).hour(), 12);
    }

    #[test]
    fn webcal_scheme_is_rewritten() {
        let source = WebcalSource::new("webcal://example.org/cal.ics").unwrap();
        assert_eq!(source.label(), "https://example.org/cal.ics");
    }
}
