use thiserror::Error;

/// Failures raised by the proxy transport.
///
/// Every variant is a transport-class failure from the delivery coordinator's
/// point of view; server rejections of a command are not errors and are
/// reported through [`crate::SubmitResult::Rejected`] instead.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("access token is required")]
    MissingAccessToken,

    #[error("vehicle identifier is required")]
    EmptyVin,

    #[error("invalid proxy base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("proxy base URL must use https, got '{scheme}'")]
    InsecureScheme { scheme: String },

    #[error("invalid command name: {0:?}")]
    InvalidCommandName(String),

    #[error("invalid header {0}")]
    InvalidHeader(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to initialize transport runtime: {0}")]
    Runtime(String),
}

impl ChannelError {
    /// HTTP status carried by the error, when the proxy answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
