//! Weather provider speaking the met.no locationforecast "compact" format.

use std::time::Duration;

use chrono::Local;
use futures::future::BoxFuture;
use serde::Deserialize;

use crate::common::error::FetchError;
use crate::data::weather::{WeatherProvider, WeatherReading};

const FORECAST_URL: &str = "https://api.met.no/weatherapi/locationforecast/2.0/compact";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeseries entries scanned for the daily high/low (hourly data).
const HIGH_LOW_WINDOW: usize = 24;

pub struct MetnoProvider {
    latitude: f64,
    longitude: f64,
    client: reqwest::Client,
}

impl MetnoProvider {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, FetchError> {
        // met.no rejects requests without an identifying user agent.
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("paneld/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(MetnoProvider {
            latitude,
            longitude,
            client,
        })
    }
}

impl WeatherProvider for MetnoProvider {
    fn label(&self) -> &str {
        "met.no"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<WeatherReading, FetchError>> {
        Box::pin(async move {
            let url = format!(
                "{FORECAST_URL}?lat={:.4}&lon={:.4}",
                self.latitude, self.longitude
            );
            let response = self.client.get(url).send().await?.error_for_status()?;
            let body = response.text().await?;
            parse_forecast(&body)
        })
    }
}

#[derive(Deserialize)]
struct Forecast {
    properties: ForecastProperties,
}

#[derive(Deserialize)]
struct ForecastProperties {
    timeseries: Vec<TimeseriesEntry>,
}

#[derive(Deserialize)]
struct TimeseriesEntry {
    data: EntryData,
}

#[derive(Deserialize)]
struct EntryData {
    instant: Instant,
    next_1_hours: Option<NextHours>,
    next_6_hours: Option<NextHours>,
}

#[derive(Deserialize)]
struct Instant {
    details: InstantDetails,
}

#[derive(Deserialize)]
struct InstantDetails {
    air_temperature: Option<f64>,
}

#[derive(Deserialize)]
struct NextHours {
    summary: NextSummary,
}

#[derive(Deserialize)]
struct NextSummary {
    symbol_code: String,
}

fn parse_forecast(body: &str) -> Result<WeatherReading, FetchError> {
    let forecast: Forecast =
        serde_json::from_str(body).map_err(|error| FetchError::Malformed(error.to_string()))?;
    let series = &forecast.properties.timeseries;

    let current = series
        .first()
        .ok_or_else(|| FetchError::Malformed("forecast timeseries is empty".into()))?;
    let temperature = current
        .data
        .instant
        .details
        .air_temperature
        .ok_or_else(|| FetchError::Malformed("forecast has no current temperature".into()))?;

    let mut high = temperature;
    let mut low = temperature;
    for entry in series.iter().take(HIGH_LOW_WINDOW) {
        if let Some(t) = entry.data.instant.details.air_temperature {
            high = high.max(t);
            low = low.min(t);
        }
    }

    let icon = current
        .data
        .next_1_hours
        .as_ref()
        .or(current.data.next_6_hours.as_ref())
        .map(|next| next.summary.symbol_code.clone())
        .unwrap_or_default();

    Ok(WeatherReading {
        temperature_c: temperature,
        high_c: high,
        low_c: low,
        description: describe(&icon),
        icon,
        fetched_at: Local::now(),
    })
}

/// "partlycloudy_day" -> "partlycloudy"; underscores become spaces.
fn describe(symbol_code: &str) -> String {
    symbol_code
        .trim_end_matches("_day")
        .trim_end_matches("_night")
        .trim_end_matches("_polartwilight")
        .replace('_', " ")
}
