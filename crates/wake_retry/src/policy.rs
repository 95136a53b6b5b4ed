use std::fmt;
use std::str::FromStr;

use crate::schedule::{ProbeBeforeSendSchedule, SendFirstSchedule};

/// Delivery strategy used by a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Probe, wake and poll until awake, then submit once.
    ProbeBeforeSend(ProbeBeforeSendSchedule),
    /// Submit first; wake and resubmit only on the sleeping-vehicle rejection.
    SendFirst(SendFirstSchedule),
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self::probe_before_send()
    }
}

impl DeliveryPolicy {
    pub const PROBE_BEFORE_SEND: &'static str = "probe-first";
    pub const SEND_FIRST: &'static str = "send-first";

    pub fn probe_before_send() -> Self {
        Self::ProbeBeforeSend(ProbeBeforeSendSchedule::default())
    }

    pub fn send_first() -> Self {
        Self::SendFirst(SendFirstSchedule::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ProbeBeforeSend(_) => Self::PROBE_BEFORE_SEND,
            Self::SendFirst(_) => Self::SEND_FIRST,
        }
    }

    /// Poll schedule used when a wake has to be awaited.
    ///
    /// Send-first delivery never polls, but a coordinator configured with it
    /// can still be asked to bring the vehicle online; that uses the default
    /// probe schedule.
    pub fn poll_schedule(&self) -> ProbeBeforeSendSchedule {
        match self {
            Self::ProbeBeforeSend(schedule) => *schedule,
            Self::SendFirst(_) => ProbeBeforeSendSchedule::default(),
        }
    }
}

impl fmt::Display for DeliveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicyError(pub String);

impl fmt::Display for ParsePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown delivery policy '{}'; expected '{}' or '{}'",
            self.0,
            DeliveryPolicy::PROBE_BEFORE_SEND,
            DeliveryPolicy::SEND_FIRST
        )
    }
}

impl std::error::Error for ParsePolicyError {}

impl FromStr for DeliveryPolicy {
    type Err = ParsePolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "probe-first" | "probe-before-send" | "probe" => Ok(Self::probe_before_send()),
            "send-first" | "send" => Ok(Self::send_first()),
            _ => Err(ParsePolicyError(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names_round_trip_through_from_str() {
        for policy in [DeliveryPolicy::probe_before_send(), DeliveryPolicy::send_first()] {
            assert_eq!(policy.name().parse::<DeliveryPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let error = "eventually".parse::<DeliveryPolicy>().unwrap_err();
        assert!(error.to_string().contains("eventually"));
    }
}
