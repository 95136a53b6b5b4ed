use std::fmt;

use vehicle_api::{ChannelError, WakeState};

/// Why a delivery stopped before reaching a definitive answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The caller set the cancel signal.
    Cancelled,
    /// The next wait would exceed the configured wait budget.
    DeadlineExceeded,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::DeadlineExceeded => write!(f, "wait budget exhausted"),
        }
    }
}

/// Terminal result of one `deliver` call.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered,
    /// The vehicle never reported awake within the poll ceiling.
    VehicleUnreachable { attempts: u32, elapsed_units: u64 },
    /// Connection, timeout, TLS, or unparseable response. Never retried.
    TransportError(ChannelError),
    /// The proxy refused the command. Carries the last rejection seen.
    RejectedByServer { status: u16, body: String },
    Aborted(AbortReason),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::VehicleUnreachable { attempts, .. } => {
                write!(f, "vehicle did not wake up after {attempts} attempts")
            }
            Self::TransportError(error) => write!(f, "transport error: {error}"),
            Self::RejectedByServer { status, body } => {
                write!(f, "command failed with status {status}: {body}")
            }
            Self::Aborted(reason) => write!(f, "delivery aborted: {reason}"),
        }
    }
}

/// Result of bringing a vehicle online without sending a command.
#[derive(Debug)]
pub enum WakeOutcome {
    /// `poll_attempts` is zero when the first probe already saw it awake.
    Awake { poll_attempts: u32, elapsed_units: u64 },
    Unreachable { attempts: u32, elapsed_units: u64 },
    TransportError(ChannelError),
    Aborted(AbortReason),
}

impl WakeOutcome {
    pub fn is_awake(&self) -> bool {
        matches!(self, Self::Awake { .. })
    }
}

impl fmt::Display for WakeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Awake { .. } => write!(f, "vehicle is awake"),
            Self::Unreachable { attempts, .. } => {
                write!(f, "vehicle did not wake up after {attempts} attempts")
            }
            Self::TransportError(error) => write!(f, "transport error: {error}"),
            Self::Aborted(reason) => write!(f, "wake aborted: {reason}"),
        }
    }
}

/// Structured progress emitted while a delivery runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryProgress {
    /// Result of the pre-flight probe. `Unknown` when the probe failed.
    WakeStateProbed { state: WakeState },
    WakeRequested { attempt: u32, accepted: bool },
    /// Periodic heartbeat while polling for the vehicle to come online.
    StillWaiting {
        attempt: u32,
        elapsed_units: u64,
        state: WakeState,
    },
    VehicleAwake { attempts: u32, elapsed_units: u64 },
    Submitting { attempt: u32 },
    RetryScheduled { attempt: u32, wait_units: u64 },
}
