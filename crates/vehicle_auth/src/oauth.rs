use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};
use tracing::{info, warn};
use url::Url;
use vehicle_api::Credential;

use crate::browser::open_browser;
use crate::callback::{CallbackListener, DEFAULT_CALLBACK_TIMEOUT};
use crate::error::AuthError;

pub const AUTHORIZE_URL: &str = "https://auth.tesla.com/oauth2/v3/authorize";
pub const TOKEN_URL: &str = "https://auth.tesla.com/oauth2/v3/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";
pub const SCOPES: &str =
    "openid offline_access vehicle_device_data vehicle_cmds vehicle_charging_cmds";

/// OAuth client registration plus flow tuning.
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    /// How long to wait for the browser redirect.
    pub callback_timeout: Duration,
    /// Launch the platform browser opener.
    pub open_browser: bool,
}

impl OAuthClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
            open_browser: true,
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    pub fn with_open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    fn validate(&self) -> Result<(), AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::MissingSetting("client id"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(AuthError::MissingSetting("client secret"));
        }
        Ok(())
    }
}

/// Build the browser authorize URL.
pub fn authorize_url(config: &OAuthClientConfig, state: &str) -> Result<Url, AuthError> {
    let mut url = Url::parse(&config.authorize_url).map_err(|error| {
        AuthError::InvalidRedirectUri {
            uri: config.authorize_url.clone(),
            reason: error.to_string(),
        }
    })?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", SCOPES)
        .append_pair("state", state);
    Ok(url)
}

/// Decode the token endpoint's JSON answer into a credential.
pub fn parse_token_response(body: &str, now_epoch_secs: i64) -> Result<Credential, AuthError> {
    let fields: Map<String, Value> = serde_json::from_str(body)
        .map_err(|error| AuthError::TokenResponse(error.to_string()))?;

    if let Some(error) = fields.get("error") {
        let mut message = match error {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        if let Some(description) = fields.get("error_description").and_then(Value::as_str) {
            message = format!("{message} ({description})");
        }
        return Err(AuthError::TokenRejected(message));
    }

    let access_token = string_field(&fields, "access_token")
        .ok_or_else(|| AuthError::TokenResponse("missing access_token".to_string()))?;
    let refresh_token = string_field(&fields, "refresh_token").unwrap_or_default();
    let expires_in = fields
        .get("expires_in")
        .and_then(Value::as_f64)
        .unwrap_or_default() as i64;

    Ok(Credential::new(
        access_token,
        refresh_token,
        now_epoch_secs.saturating_add(expires_in),
    ))
}

/// Exchange an authorization code at the token endpoint.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &OAuthClientConfig,
    code: &str,
) -> Result<Credential, AuthError> {
    let response = http
        .post(&config.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await?;
    let body = response.text().await?;
    parse_token_response(&body, current_epoch_secs())
}

/// Run the full authorization-code flow.
///
/// `on_authorize_url` receives the URL before the browser is launched so the
/// caller can print it for manual copy.
pub async fn authenticate<F>(
    config: &OAuthClientConfig,
    on_authorize_url: F,
) -> Result<Credential, AuthError>
where
    F: FnOnce(&Url),
{
    config.validate()?;
    let listener = CallbackListener::bind_redirect_uri(&config.redirect_uri).await?;
    let state = current_epoch_secs().to_string();
    let url = authorize_url(config, &state)?;

    on_authorize_url(&url);
    if config.open_browser {
        if let Err(error) = open_browser(url.as_str()) {
            warn!(%error, "failed to launch browser; use the printed URL");
        }
    }

    let code = listener.wait_for_code(config.callback_timeout).await?;
    info!("authorization code received; exchanging for tokens");

    let http = reqwest::Client::builder().build()?;
    exchange_code(&http, config, &code).await
}

/// Blocking wrapper around [`authenticate`] on a private runtime.
pub fn authenticate_blocking<F>(
    config: &OAuthClientConfig,
    on_authorize_url: F,
) -> Result<Credential, AuthError>
where
    F: FnOnce(&Url),
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| AuthError::Runtime(error.to_string()))?;
    runtime.block_on(authenticate(config, on_authorize_url))
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn current_epoch_secs() -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(now.as_secs()).unwrap_or(i64::MAX)
}
