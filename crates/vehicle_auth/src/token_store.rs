use std::fs;
use std::path::Path;

use tracing::debug;
use vehicle_api::Credential;

use crate::error::AuthError;

/// Default token file name, relative to the working directory.
pub const DEFAULT_TOKENS_FILE: &str = "tesla-tokens.json";

pub fn load_credential(path: &Path) -> Result<Credential, AuthError> {
    let raw = fs::read_to_string(path).map_err(|source| AuthError::Io {
        operation: "reading token file",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| AuthError::TokenFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the credential as indented JSON, replacing a stray directory of the
/// same name if one is in the way.
pub fn save_credential(path: &Path, credential: &Credential) -> Result<(), AuthError> {
    if path.is_dir() {
        debug!(path = %path.display(), "removing directory in place of token file");
        fs::remove_dir_all(path).map_err(|source| AuthError::Io {
            operation: "removing directory at token path",
            path: path.to_path_buf(),
            source,
        })?;
    }

    let mut encoded =
        serde_json::to_string_pretty(credential).map_err(|source| AuthError::TokenFile {
            path: path.to_path_buf(),
            source,
        })?;
    encoded.push('\n');
    fs::write(path, encoded).map_err(|source| AuthError::Io {
        operation: "writing token file",
        path: path.to_path_buf(),
        source,
    })
}
