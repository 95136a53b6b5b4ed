//! Interactive vehicle command client.
//!
//! Loads configuration from `.env`, obtains an OAuth credential, and drives a
//! [`wake_retry::WakeRetryCoordinator`] over the local command proxy. The
//! binary in `main.rs` is a thin shell around [`app::Session`].

pub mod app;
pub mod config;
pub mod interrupt;
pub mod logging;
pub mod menu;
pub mod render;

pub use app::Session;
pub use config::{AppConfig, ConfigError};
pub use menu::{MenuChoice, VehicleAction};
