use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse token file {path}: {source}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is required")]
    MissingSetting(&'static str),

    #[error("invalid redirect URI '{uri}': {reason}")]
    InvalidRedirectUri { uri: String, reason: String },

    #[error("failed to listen for the authorization callback on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("authorization callback connection failed: {0}")]
    Callback(#[source] std::io::Error),

    #[error("authorization failed: {0}")]
    Denied(String),

    #[error("no authorization code received")]
    MissingCode,

    #[error("authorization timeout after {secs}s - please try again")]
    Timeout { secs: u64 },

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token error: {0}")]
    TokenRejected(String),

    #[error("failed to decode token response: {0}")]
    TokenResponse(String),

    #[error("failed to initialize auth runtime: {0}")]
    Runtime(String),
}
