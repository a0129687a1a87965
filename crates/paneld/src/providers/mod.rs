//! Thin network collaborators behind the data-source traits. All engineering
//! weight stays in the refresh engine; these only speak HTTP and translate
//! payloads and transport failures into domain terms.

pub mod metno;
pub mod webcal;

use reqwest::StatusCode;

use crate::common::error::FetchError;
use crate::config::CalendarConfig;
use crate::data::calendar::CalendarSource;
use crate::providers::webcal::WebcalSource;

/// Transport errors classified into the retryable/fatal taxonomy.
impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        let message = error.to_string();
        if error.is_timeout() {
            FetchError::Timeout(message)
        } else if error.is_connect() {
            FetchError::Connection(message)
        } else if error.is_decode() || error.is_body() {
            FetchError::Malformed(message)
        } else if let Some(status) = error.status() {
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                FetchError::Auth(message)
            } else {
                FetchError::Protocol(message)
            }
        } else {
            FetchError::Protocol(message)
        }
    }
}

/// Builds the calendar sources described in the config. A record that cannot
/// be turned into a source is logged and skipped; the daemon starts with
/// whatever subset is usable.
pub fn build_calendar_sources(config: &CalendarConfig) -> Vec<Box<dyn CalendarSource>> {
    let mut sources: Vec<Box<dyn CalendarSource>> = Vec::new();
    for record in &config.sources {
        match record.kind.to_lowercase().as_str() {
            "webcal" => match WebcalSource::new(&record.url) {
                Ok(source) => sources.push(Box::new(source)),
                Err(error) => {
                    log::error!("Cannot create webcal source \"{}\": {error}", record.url);
                }
            },
            "caldav" => {
                log::error!(
                    "CalDAV calendar \"{}\" is not supported by this build, skipping",
                    record.url
                );
            }
            other => log::error!("calendar type not recognized: {other}"),
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalendarSourceConfig;

    #[test]
    fn unknown_source_types_are_skipped() {
        let config = CalendarConfig {
            refresh: std::time::Duration::from_secs(900),
            sources: vec![
                CalendarSourceConfig {
                    kind: "webcal".into(),
                    url: "https://example.org/a.ics".into(),
                    username: None,
                    password: None,
                },
                CalendarSourceConfig {
                    kind: "carrier-pigeon".into(),
                    url: "coop://roof".into(),
                    username: None,
                    password: None,
                },
            ],
        };
        let sources = build_calendar_sources(&config);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].label(), "https://example.org/a.ics");
    }
}
