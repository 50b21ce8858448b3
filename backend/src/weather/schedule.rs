//! Refresh timing.
//!
//! Every installation refreshes once an hour at its own random minute and
//! second so requests to the forecast API are spread out. A failed refresh
//! may additionally arm a one-shot retry.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::refresher::{ForecastRefresher, RefreshOutcome};

/// Fires once per hour at a fixed minute and second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlySchedule {
    minute: u32,
    second: u32,
}

impl HourlySchedule {
    pub fn new(minute: u32, second: u32) -> Self {
        Self {
            minute: minute % 60,
            second: second % 60,
        }
    }

    /// Minute in `1..10`, second in `0..59`.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::new(rng.gen_range(1..10), rng.gen_range(0..59))
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn second(&self) -> u32 {
        self.second
    }

    /// The first tick strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let candidate = now
            .date_naive()
            .and_hms_opt(now.hour(), self.minute, self.second)
            .map(|naive| naive.and_utc());

        match candidate {
            Some(tick) if tick > now => tick,
            Some(tick) => tick + Duration::hours(1),
            None => now + Duration::hours(1),
        }
    }
}

/// Picks the next wake-up: the hourly tick, or a pending retry if it is earlier.
fn next_wake(
    schedule: &HourlySchedule,
    pending_retry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, bool) {
    let tick = schedule.next_after(now);
    match pending_retry {
        Some(retry) if retry < tick => (retry, true),
        _ => (tick, false),
    }
}

/// Handle to a running forecast loop.
pub struct ForecastLoop {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<ForecastRefresher>,
}

impl ForecastLoop {
    /// Refresh immediately, then keep refreshing on `schedule`.
    pub fn spawn(refresher: ForecastRefresher, schedule: HourlySchedule) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(run(refresher, schedule, rx));
        Self { shutdown, task }
    }

    /// Stop the loop and hand back the refresher.
    pub async fn shutdown(self) -> Option<ForecastRefresher> {
        let _ = self.shutdown.send(true);
        self.task.await.ok()
    }
}

async fn run(
    mut refresher: ForecastRefresher,
    schedule: HourlySchedule,
    mut shutdown: watch::Receiver<bool>,
) -> ForecastRefresher {
    info!(
        minute = schedule.minute(),
        second = schedule.second(),
        "Forecast refresh scheduled hourly"
    );

    let mut pending_retry = retry_of(refresher.update(Utc::now()).await);

    loop {
        let now = Utc::now();
        let (wake, is_retry) = next_wake(&schedule, pending_retry, now);
        let wait = (wake - now).to_std().unwrap_or(StdDuration::ZERO);
        debug!(%wake, is_retry, "Waiting for next forecast refresh");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => break,
        }

        if is_retry {
            pending_retry = None;
        }
        if let Some(at) = retry_of(refresher.update(Utc::now()).await) {
            pending_retry = Some(at);
        }
    }

    info!("Forecast loop stopped");
    refresher
}

fn retry_of(outcome: RefreshOutcome) -> Option<DateTime<Utc>> {
    match outcome {
        RefreshOutcome::RetryScheduled(at) => Some(at),
        _ => None,
    }
}
