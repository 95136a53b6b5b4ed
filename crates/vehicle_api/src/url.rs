use url::Url;

use crate::error::ChannelError;
use crate::vehicle::Vin;

/// Default base URL of the local command proxy.
pub const DEFAULT_PROXY_BASE_URL: &str = "https://localhost:4443";

/// Normalize and validate a proxy base URL.
///
/// Rules:
/// 1) blank input falls back to [`DEFAULT_PROXY_BASE_URL`]
/// 2) trailing slashes are dropped
/// 3) only `https` is accepted
pub fn normalize_proxy_base_url(input: &str) -> Result<Url, ChannelError> {
    let base = if input.trim().is_empty() {
        DEFAULT_PROXY_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|error| {
        ChannelError::InvalidBaseUrl(format!("{trimmed}: {error}"))
    })?;
    if url.scheme() != "https" {
        return Err(ChannelError::InsecureScheme {
            scheme: url.scheme().to_string(),
        });
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ChannelError::InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(url)
}

/// `{base}/api/1/vehicles/{vin}`
pub fn vehicle_url(base: &Url, vin: &Vin) -> Result<Url, ChannelError> {
    join_segments(base, &["api", "1", "vehicles", vin.as_str()])
}

/// `{base}/api/1/vehicles/{vin}/wake_up`
pub fn wake_up_url(base: &Url, vin: &Vin) -> Result<Url, ChannelError> {
    join_segments(base, &["api", "1", "vehicles", vin.as_str(), "wake_up"])
}

/// `{base}/api/1/vehicles/{vin}/command/{name}`
pub fn command_url(base: &Url, vin: &Vin, name: &str) -> Result<Url, ChannelError> {
    if name.is_empty() || name.contains('/') {
        return Err(ChannelError::InvalidCommandName(name.to_string()));
    }
    join_segments(
        base,
        &["api", "1", "vehicles", vin.as_str(), "command", name],
    )
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ChannelError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ChannelError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
