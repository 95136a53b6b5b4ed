//! Wake-and-retry command delivery for a single vehicle.
//!
//! [`WakeRetryCoordinator`] drives a [`vehicle_api::VehicleCommandChannel`]
//! until a command is delivered or a definitive failure is known. Two
//! strategies are available through [`DeliveryPolicy`]:
//!
//! - probe-before-send: check reachability, wake and poll if needed, then
//!   submit once;
//! - send-first: submit immediately and only wake/retry when the proxy answers
//!   with the sleeping-vehicle signature.
//!
//! Waiting goes through the [`Sleeper`] trait and every schedule is a pure
//! function of the attempt index, so the whole protocol runs instantly under
//! test.

pub mod coordinator;
pub mod outcome;
pub mod policy;
pub mod schedule;
pub mod sleeper;

pub use coordinator::{DeliveryConfig, WakeRetryCoordinator};
pub use outcome::{AbortReason, DeliveryOutcome, DeliveryProgress, WakeOutcome};
pub use policy::{DeliveryPolicy, ParsePolicyError};
pub use schedule::{ProbeBeforeSendSchedule, SendFirstSchedule};
pub use sleeper::{CancelSignal, Sleeper, ThreadSleeper};
