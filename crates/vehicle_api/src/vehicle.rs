use std::fmt;

use crate::error::ChannelError;

/// Vehicle identification number as accepted by the proxy.
///
/// Only non-emptiness is enforced here; stripping separators and upper-casing
/// belong to whoever loads the value from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vin(String);

impl Vin {
    pub fn new(value: impl Into<String>) -> Result<Self, ChannelError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ChannelError::EmptyVin);
        }
        Ok(Self(value.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reachability of the vehicle as last observed by a status probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WakeState {
    /// No successful probe yet.
    #[default]
    Unknown,
    Asleep,
    Awake,
}

impl WakeState {
    pub fn is_awake(self) -> bool {
        matches!(self, Self::Awake)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Asleep => "asleep",
            Self::Awake => "awake",
        }
    }
}

impl fmt::Display for WakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
