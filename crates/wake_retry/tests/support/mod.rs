#![allow(dead_code)]

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vehicle_api::Vin;
use vehicle_api_mock::lock_unpoisoned;
use wake_retry::{CancelSignal, DeliveryConfig, DeliveryProgress, Sleeper};

/// Sleeper that records requested waits in schedule units and returns at once.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
    cancel_after: Option<usize>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the cancel signal once this many waits have been recorded.
    pub fn cancelling_after(waits: usize) -> Self {
        Self {
            waits: Arc::default(),
            cancel_after: Some(waits),
        }
    }

    pub fn waits(&self) -> Vec<Duration> {
        lock_unpoisoned(&self.waits).clone()
    }

    /// Recorded waits expressed in whole schedule units.
    pub fn wait_units(&self) -> Vec<u64> {
        self.waits()
            .into_iter()
            .map(|wait| (wait.as_millis() / UNIT.as_millis()) as u64)
            .collect()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration, cancel: Option<&CancelSignal>) {
        let mut waits = lock_unpoisoned(&self.waits);
        waits.push(duration);
        if let (Some(limit), Some(cancel)) = (self.cancel_after, cancel) {
            if waits.len() >= limit {
                cancel.store(true, Ordering::Release);
            }
        }
    }
}

/// Schedule unit used by every test: short enough to never matter, distinct
/// enough to convert back from a `Duration`.
pub const UNIT: Duration = Duration::from_millis(10);

pub fn test_config() -> DeliveryConfig {
    DeliveryConfig::default().with_time_unit(UNIT)
}

pub fn vin() -> Vin {
    Vin::new("5YJ3E1EA7KF000001").expect("test vin")
}

pub fn collect_progress() -> (Arc<Mutex<Vec<DeliveryProgress>>>, impl FnMut(DeliveryProgress)) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |event| lock_unpoisoned(&sink).push(event))
}
