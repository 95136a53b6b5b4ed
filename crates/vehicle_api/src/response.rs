//! Classification of raw proxy responses into domain results.
//!
//! These functions are pure over `(status, body)` so the channel's decision
//! table can be exercised without a socket.

use serde_json::Value;

use crate::error::ChannelError;
use crate::vehicle::WakeState;

/// Body text the proxy uses when a command hits a sleeping vehicle.
///
/// This is matched as a plain substring of the response body. It tracks the
/// upstream error wording; if the API ever exposes a structured error code for
/// this condition, [`is_vehicle_unavailable`] is the one place to switch over.
pub const VEHICLE_UNAVAILABLE_SIGNATURE: &str = "vehicle unavailable";

const ONLINE_STATE: &str = "online";

/// Result of a command submission that reached the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    Delivered,
    Rejected(Rejection),
}

/// A non-2xx answer to a command submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: u16,
    pub body: String,
}

impl Rejection {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether this rejection means "vehicle asleep" rather than a refusal.
    pub fn is_vehicle_unavailable(&self) -> bool {
        is_vehicle_unavailable(&self.body)
    }
}

pub fn is_vehicle_unavailable(body: &str) -> bool {
    body.contains(VEHICLE_UNAVAILABLE_SIGNATURE)
}

/// Classify a vehicle status response.
///
/// A non-empty top-level `error` means the vehicle is offline, whatever the
/// status code. Otherwise a 2xx with `response.state == "online"` is awake and
/// any other 2xx is asleep.
pub fn classify_probe(status: u16, body: &str) -> Result<WakeState, ChannelError> {
    let parsed = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(error) if is_success(status) => return Err(ChannelError::Parse(error)),
        Err(_) => return Err(status_error(status, body)),
    };

    if parsed.get("error").is_some_and(error_is_present) {
        return Ok(WakeState::Asleep);
    }

    if !is_success(status) {
        return Err(status_error(status, body));
    }

    let online = parsed
        .pointer("/response/state")
        .and_then(Value::as_str)
        .is_some_and(|state| state == ONLINE_STATE);
    Ok(if online {
        WakeState::Awake
    } else {
        WakeState::Asleep
    })
}

/// Classify a wake trigger response.
pub fn classify_wake(status: u16, body: &str) -> Result<(), ChannelError> {
    if is_success(status) {
        Ok(())
    } else {
        Err(status_error(status, body))
    }
}

/// Classify a command submission response.
pub fn classify_submit(status: u16, body: &str) -> SubmitResult {
    if is_success(status) {
        SubmitResult::Delivered
    } else {
        SubmitResult::Rejected(Rejection::new(status, body))
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn status_error(status: u16, body: &str) -> ChannelError {
    ChannelError::Status {
        status,
        body: body.to_string(),
    }
}

fn error_is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(message) => !message.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
