//! Forecast refresh: fetch, swap, select, publish.
//!
//! A refresh fetches a new document only when the model's `nextrun` has
//! passed (or no document has been fetched yet). Fetch and parse failures
//! keep the previous document and go down the retry path instead of
//! propagating.

use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::client::ForecastSource;
use super::error::WeatherResult;
use super::parser::parse_forecast;
use super::selector::ForecastSelector;
use super::sensor::WeatherSensor;
use super::sink::EntityUpdateSink;
use crate::models::{ForecastDocument, SensorType};

pub const RETRY_DELAY_MINUTES: i64 = 15;

/// Result of one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Selection ran; `changed` sensors were published.
    Updated { changed: usize },
    /// Fetch or parse failed; try again at the given instant.
    RetryScheduled(DateTime<Utc>),
    /// Fetch or parse failed and the retry was not armed.
    RetryDropped,
}

/// When to retry after a failure at `now`, if at all.
///
/// The retry is only armed when it lands at minute 15 or later of its hour.
/// Failures between :45 and :59 therefore get no retry and wait for the next
/// hourly refresh.
pub fn retry_at(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let next = now + Duration::minutes(RETRY_DELAY_MINUTES);
    (next.minute() >= 15).then_some(next)
}

/// Owns the active forecast document and the sensors fed from it.
pub struct ForecastRefresher {
    source: Arc<dyn ForecastSource>,
    selector: ForecastSelector,
    sensors: Vec<WeatherSensor>,
    sink: Arc<dyn EntityUpdateSink>,
    document: Option<ForecastDocument>,
    next_run: Option<DateTime<Utc>>,
}

impl ForecastRefresher {
    pub fn new(
        source: Arc<dyn ForecastSource>,
        selector: ForecastSelector,
        sensors: Vec<WeatherSensor>,
        sink: Arc<dyn EntityUpdateSink>,
    ) -> Self {
        Self {
            source,
            selector,
            sensors,
            sink,
            document: None,
            next_run: None,
        }
    }

    /// The last successfully parsed document.
    pub fn document(&self) -> Option<&ForecastDocument> {
        self.document.as_ref()
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.next_run
    }

    pub fn sensors(&self) -> &[WeatherSensor] {
        &self.sensors
    }

    fn needs_fetch(&self, now: DateTime<Utc>) -> bool {
        match self.next_run {
            None => true,
            Some(next_run) => now >= next_run,
        }
    }

    async fn fetch_document(&self) -> WeatherResult<ForecastDocument> {
        let text = self.source.fetch().await?;
        parse_forecast(&text)
    }

    fn try_again(&mut self, now: DateTime<Utc>, reason: &dyn std::fmt::Display) -> RefreshOutcome {
        warn!("Retrying in {} minutes: {}", RETRY_DELAY_MINUTES, reason);
        self.next_run = None;
        match retry_at(now) {
            Some(at) => RefreshOutcome::RetryScheduled(at),
            None => RefreshOutcome::RetryDropped,
        }
    }

    /// Run one refresh at `now`.
    pub async fn update(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        if self.needs_fetch(now) {
            match self.fetch_document().await {
                Ok(document) => {
                    info!(
                        entries = document.entries.len(),
                        next_run = %document.next_run,
                        "Forecast updated"
                    );
                    self.next_run = Some(document.next_run);
                    self.document = Some(document);
                }
                Err(err) => return self.try_again(now, &err),
            }
        }

        let Some(document) = self.document.as_ref() else {
            return RefreshOutcome::Updated { changed: 0 };
        };

        let subscriptions: Vec<SensorType> =
            self.sensors.iter().map(WeatherSensor::sensor_type).collect();
        let selection = self.selector.select(document, now, &subscriptions);
        if selection.is_empty() {
            debug!("Every forecast entry has expired; keeping sensor states");
            return RefreshOutcome::Updated { changed: 0 };
        }

        let mut updates = Vec::new();
        for sensor in &mut self.sensors {
            let state = selection.get(&sensor.sensor_type()).cloned().flatten();
            if sensor.set_state(state) {
                updates.push(sensor.snapshot());
            }
        }

        let changed = updates.len();
        let sink = &self.sink;
        join_all(updates.into_iter().map(|update| sink.publish(update))).await;

        RefreshOutcome::Updated { changed }
    }
}

#[cfg(test)]
#[path = "refresher_tests.rs"]
mod refresher_tests;
