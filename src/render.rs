//! User-facing text for delivery progress and outcomes.

use std::time::Duration;

use vehicle_api::WakeState;
use wake_retry::{DeliveryOutcome, DeliveryProgress, WakeOutcome};

/// Wall-clock seconds covered by `units` schedule units.
pub fn elapsed_secs(units: u64, time_unit: Duration) -> u64 {
    time_unit
        .saturating_mul(u32::try_from(units).unwrap_or(u32::MAX))
        .as_secs()
}

/// Line to print for a progress event, if any.
pub fn progress_line(progress: &DeliveryProgress, time_unit: Duration) -> Option<String> {
    match *progress {
        DeliveryProgress::WakeStateProbed { state } => Some(match state {
            WakeState::Awake => "Vehicle is awake".to_string(),
            WakeState::Asleep => "Vehicle is sleeping".to_string(),
            WakeState::Unknown => "Could not check vehicle state; waking anyway".to_string(),
        }),
        DeliveryProgress::WakeRequested { attempt, accepted } => Some(match (attempt, accepted) {
            (1, true) => "Wake command sent".to_string(),
            (_, true) => format!("Wake command sent (attempt {attempt})"),
            (_, false) => format!("Wake command failed (attempt {attempt})"),
        }),
        DeliveryProgress::StillWaiting { elapsed_units, .. } => Some(format!(
            "   Still waiting... ({} seconds elapsed)",
            elapsed_secs(elapsed_units, time_unit)
        )),
        DeliveryProgress::VehicleAwake { .. } => Some("Vehicle is now awake!".to_string()),
        DeliveryProgress::Submitting { attempt } if attempt > 1 => {
            Some(format!("Resending command (attempt {attempt})"))
        }
        DeliveryProgress::Submitting { .. } => None,
        DeliveryProgress::RetryScheduled { wait_units, .. } => Some(format!(
            "Vehicle unavailable; retrying in {} seconds",
            elapsed_secs(wait_units, time_unit)
        )),
    }
}

/// Final line for a delivery, `success` on delivery.
pub fn delivery_line(outcome: &DeliveryOutcome, success: &str) -> String {
    match outcome {
        DeliveryOutcome::Delivered => success.to_string(),
        DeliveryOutcome::VehicleUnreachable { .. } => {
            format!("Error: Could not wake vehicle: {outcome}")
        }
        other => format!("Error: {other}"),
    }
}

pub fn wake_line(outcome: &WakeOutcome) -> String {
    match outcome {
        WakeOutcome::Awake { .. } => "Vehicle is ready".to_string(),
        other => format!("Warning: Could not verify vehicle is awake: {other}"),
    }
}
