use serde::{Deserialize, Serialize};

/// OAuth token set as persisted in the token file.
///
/// Only `access_token` is consumed by the transport; the rest is carried so a
/// loaded file can be written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Expiry as Unix epoch seconds.
    #[serde(default)]
    pub expires_at: i64,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// A credential without an access token cannot authenticate anything.
    pub fn has_access_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}
