use chrono::{DateTime, Local};
use futures::future::BoxFuture;

use crate::common::error::FetchError;
use crate::refresh::Refresher;
use crate::refresh::backoff::{RetryPolicy, retry_with_backoff};

/// One successful forecast fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub high_c: f64,
    pub low_c: f64,
    pub description: String,
    pub icon: String,
    pub fetched_at: DateTime<Local>,
}

impl WeatherReading {
    /// "22°/14°" style range, as shown on the weather screen.
    pub fn high_low(&self) -> String {
        format!("{}°/{}°", self.high_c.round(), self.low_c.round())
    }
}

/// Published weather state. Starts out empty; screens render "no data" until
/// the first successful fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    pub reading: Option<WeatherReading>,
}

pub trait WeatherProvider: Send + Sync {
    fn label(&self) -> &str;
    fn fetch(&self) -> BoxFuture<'_, Result<WeatherReading, FetchError>>;
}

/// Fetch cycle for the single configured weather provider.
pub struct WeatherRefresher {
    provider: Box<dyn WeatherProvider>,
    policy: RetryPolicy,
}

impl WeatherRefresher {
    pub fn new(provider: Box<dyn WeatherProvider>, policy: RetryPolicy) -> Self {
        WeatherRefresher { provider, policy }
    }
}

impl Refresher for WeatherRefresher {
    type Snapshot = WeatherSnapshot;

    fn label(&self) -> &'static str {
        "weather"
    }

    fn run_cycle(&mut self) -> BoxFuture<'_, Result<WeatherSnapshot, FetchError>> {
        Box::pin(async move {
            let reading = retry_with_backoff(
                &self.policy,
                self.provider.label(),
                || self.provider.fetch(),
                FetchError::is_retryable,
            )
            .await?;
            log::debug!("Weather updated successfully");
            Ok(WeatherSnapshot {
                reading: Some(reading),
            })
        })
    }
}
