//! Nearest-window selection of forecast values.
//!
//! Not every time entry carries every variable: instantaneous entries hold
//! temperature, wind, pressure and clouds, while interval entries hold
//! precipitation and the weather symbol. So the selector ranks all entries by
//! distance to the target instant and, per sensor, takes the first ranked
//! entry that has the sensor's variable.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::models::{ForecastDocument, ScalarValue, SensorType, TimeEntry};

/// A retained entry together with its distance score.
#[derive(Debug, Clone, Copy)]
pub struct RankedEntry<'a> {
    /// `|valid_to - target| + |valid_from - target|` in milliseconds.
    pub score: i64,
    pub entry: &'a TimeEntry,
}

/// Distance of an entry's window from `target`.
///
/// The two endpoint distances are summed, not averaged.
pub fn distance_score(entry: &TimeEntry, target: DateTime<Utc>) -> i64 {
    (entry.valid_to - target).num_milliseconds().abs()
        + (entry.valid_from - target).num_milliseconds().abs()
}

/// Rank the entries of `document` that have not expired at `now`.
///
/// Entries with `valid_to <= now` are dropped. The rest are ordered by
/// ascending score; equal scores keep document order.
pub fn rank_entries<'a>(
    document: &'a ForecastDocument,
    now: DateTime<Utc>,
    target: DateTime<Utc>,
) -> Vec<RankedEntry<'a>> {
    let mut ranked: Vec<RankedEntry<'a>> = document
        .entries
        .iter()
        .filter(|entry| entry.valid_to > now)
        .map(|entry| RankedEntry {
            score: distance_score(entry, target),
            entry,
        })
        .collect();

    // sort_by_key is stable
    ranked.sort_by_key(|ranked| ranked.score);
    ranked
}

/// Pick the value for one sensor from already ranked entries.
///
/// The scan stops at the first entry that has the variable, even if the
/// value cannot be extracted from it.
pub fn select_value(ranked: &[RankedEntry<'_>], sensor_type: SensorType) -> Option<ScalarValue> {
    ranked
        .iter()
        .find_map(|ranked| ranked.entry.variable(sensor_type.key()))
        .and_then(|variable| sensor_type.extract(variable))
}

/// Select a value per subscription.
///
/// Returns an empty map when every entry has expired; callers must then
/// leave sensor states untouched. Otherwise every subscription has a key,
/// with `None` meaning no retained entry carries that variable.
pub fn select(
    document: &ForecastDocument,
    now: DateTime<Utc>,
    target: DateTime<Utc>,
    subscriptions: &[SensorType],
) -> BTreeMap<SensorType, Option<ScalarValue>> {
    let ranked = rank_entries(document, now, target);
    if ranked.is_empty() {
        return BTreeMap::new();
    }

    subscriptions
        .iter()
        .map(|sensor_type| (*sensor_type, select_value(&ranked, *sensor_type)))
        .collect()
}

/// Selection bound to a forecast offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForecastSelector {
    forecast_hours: i64,
}

impl ForecastSelector {
    pub fn new(forecast_hours: i64) -> Self {
        Self { forecast_hours }
    }

    pub fn forecast_hours(&self) -> i64 {
        self.forecast_hours
    }

    /// The instant selection optimizes distance to.
    ///
    /// Falls back to `now` when the offset leaves the representable range.
    pub fn target_instant(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let target = Duration::try_hours(self.forecast_hours)
            .and_then(|offset| now.checked_add_signed(offset));
        match target {
            Some(target) => target,
            None => {
                warn!(
                    forecast_hours = self.forecast_hours,
                    "Forecast offset out of range, using current time"
                );
                now
            }
        }
    }

    pub fn select(
        &self,
        document: &ForecastDocument,
        now: DateTime<Utc>,
        subscriptions: &[SensorType],
    ) -> BTreeMap<SensorType, Option<ScalarValue>> {
        select(document, now, self.target_instant(now), subscriptions)
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
