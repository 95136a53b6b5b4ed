use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ProxyConfig;
use crate::error::ChannelError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_USER_AGENT: &str = "user-agent";

const JSON_MEDIA_TYPE: &str = "application/json";
const CLIENT_NAME: &str = "tesla-cli";

/// Build a deterministic header map for proxy requests.
pub fn build_headers(config: &ProxyConfig) -> Result<BTreeMap<String, String>, ChannelError> {
    let token = config.access_token.trim();
    if token.is_empty() {
        return Err(ChannelError::MissingAccessToken);
    }

    let mut headers = BTreeMap::new();
    headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {token}"));
    headers.insert(HEADER_ACCEPT.to_owned(), JSON_MEDIA_TYPE.to_owned());
    headers.insert(HEADER_CONTENT_TYPE.to_owned(), JSON_MEDIA_TYPE.to_owned());

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), user_agent);

    Ok(headers)
}

/// Convert [`build_headers`] output into a reqwest header map.
pub fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ChannelError> {
    let mut out = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ChannelError::InvalidHeader(format!("key: {key}")))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| ChannelError::InvalidHeader(format!("value for {key}")))?;
        if key == HEADER_AUTHORIZATION {
            value.set_sensitive(true);
        }
        out.insert(name, value);
    }
    Ok(out)
}

fn default_user_agent() -> String {
    match host_platform() {
        Some((os, release, arch)) => format!("{CLIENT_NAME} ({os} {release}; {arch})"),
        None => CLIENT_NAME.to_owned(),
    }
}

/// Map kernel machine names onto the short forms used in the agent string.
fn normalize_arch(machine: &str) -> String {
    let machine = machine.to_ascii_lowercase();
    match machine.as_str() {
        "x86_64" | "amd64" => "x64".to_owned(),
        "aarch64" => "arm64".to_owned(),
        _ => machine,
    }
}

/// `(sysname, release, machine)` from `uname(2)`.
#[cfg(unix)]
fn host_platform() -> Option<(String, String, String)> {
    use std::ffi::{c_char, CStr};

    fn field(raw: &[c_char]) -> String {
        // SAFETY: uname fills each field with a NUL-terminated string.
        unsafe { CStr::from_ptr(raw.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    // SAFETY: utsname is plain old data; all-zero is a valid value.
    let mut info: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: `info` is a valid, writable utsname.
    if unsafe { libc::uname(&mut info) } != 0 {
        return None;
    }

    let os = field(&info.sysname).to_lowercase();
    let release = field(&info.release);
    let arch = normalize_arch(&field(&info.machine));
    if os.is_empty() || release.is_empty() || arch.is_empty() {
        return None;
    }
    Some((os, release, arch))
}

#[cfg(not(unix))]
fn host_platform() -> Option<(String, String, String)> {
    None
}
