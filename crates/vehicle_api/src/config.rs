use std::time::Duration;

use crate::url::DEFAULT_PROXY_BASE_URL;

/// Default per-request timeout toward the proxy.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport configuration for proxy requests.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// OAuth bearer token passed to `Authorization`.
    pub access_token: String,
    /// Base URL of the local command proxy. Must be `https`.
    pub base_url: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Per-request timeout, independent of any retry budget.
    pub timeout: Duration,
    /// Skip certificate chain verification toward the proxy.
    ///
    /// The proxy presents a local or self-signed certificate and terminates
    /// the manufacturer-grade TLS itself. Transport is still HTTPS-only.
    pub accept_invalid_certs: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: DEFAULT_PROXY_BASE_URL.to_string(),
            user_agent: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            accept_invalid_certs: true,
        }
    }
}

impl ProxyConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}
