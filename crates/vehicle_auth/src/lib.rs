//! OAuth authorization-code login and token persistence for the vehicle CLI.
//!
//! The flow is: bind a loopback callback listener on the redirect URI, send
//! the user's browser to the authorize page, wait (bounded) for the redirect
//! carrying the code, then exchange the code for a [`Credential`].
//!
//! Tokens are never refreshed here; a loaded credential is used as-is.

pub mod browser;
pub mod callback;
pub mod error;
pub mod oauth;
pub mod token_store;

pub use callback::CallbackListener;
pub use error::AuthError;
pub use oauth::{authenticate, authenticate_blocking, OAuthClientConfig};
pub use token_store::{load_credential, save_credential};
pub use vehicle_api::Credential;
