//! Transport-only client primitives for the local vehicle command proxy.
//!
//! This crate owns request building and response classification for the three
//! proxy endpoints the command flow needs: vehicle status, wake trigger, and
//! command submission. It contains no retry policy, no OAuth login code, and
//! no terminal coupling.
//!
//! [`VehicleCommandChannel`] is the seam the delivery coordinator drives;
//! [`ProxyChannel`] is the reqwest-backed implementation.

pub mod channel;
pub mod config;
pub mod credential;
pub mod error;
pub mod headers;
pub mod payload;
pub mod response;
pub mod url;
pub mod vehicle;

pub use channel::{ProxyChannel, VehicleCommandChannel};
pub use config::ProxyConfig;
pub use credential::Credential;
pub use error::ChannelError;
pub use payload::CommandRequest;
pub use response::{is_vehicle_unavailable, Rejection, SubmitResult};
pub use crate::url::normalize_proxy_base_url;
pub use vehicle::{Vin, WakeState};
