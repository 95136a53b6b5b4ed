use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Url;

use crate::error::AuthError;

/// Default bound on how long to wait for the browser redirect.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const MAX_REQUEST_HEAD_BYTES: usize = 8 * 1024;
const CONNECTION_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Loopback listener that captures the authorization code from the redirect.
#[derive(Debug)]
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

/// What the listener made of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    Code(String),
    Denied(String),
    MissingCode,
    /// Not the redirect path (favicon probes and the like).
    Ignored,
}

impl CallbackListener {
    /// Bind to the host and port of `redirect_uri`.
    pub async fn bind_redirect_uri(redirect_uri: &str) -> Result<Self, AuthError> {
        let (addr, path) = redirect_target(redirect_uri)?;
        Self::bind(&addr, path).await
    }

    /// Bind to an explicit address, serving callbacks on `path`.
    pub async fn bind(addr: &str, path: impl Into<String>) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| AuthError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self {
            listener,
            path: path.into(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AuthError> {
        self.listener.local_addr().map_err(AuthError::Callback)
    }

    /// Wait for the redirect and return the authorization code.
    pub async fn wait_for_code(&self, timeout: Duration) -> Result<String, AuthError> {
        match tokio::time::timeout(timeout, self.accept_until_callback()).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout {
                secs: timeout.as_secs(),
            }),
        }
    }

    async fn accept_until_callback(&self) -> Result<String, AuthError> {
        let (results, mut received) = mpsc::unbounded_channel();
        let path: Arc<str> = Arc::from(self.path.as_str());
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (socket, peer) = accepted.map_err(AuthError::Callback)?;
                    connections.spawn(serve_connection(
                        socket,
                        peer,
                        Arc::clone(&path),
                        results.clone(),
                    ));
                }
                Some(result) = received.recv() => {
                    return match result {
                        CallbackResult::Code(code) => Ok(code),
                        CallbackResult::Denied(reason) => Err(AuthError::Denied(reason)),
                        CallbackResult::MissingCode | CallbackResult::Ignored => {
                            Err(AuthError::MissingCode)
                        }
                    };
                }
            }
        }
    }
}

/// Answer one connection. Browsers open spare connections that may never
/// send a request, so each one runs on its own task with a read deadline.
async fn serve_connection(
    mut socket: TcpStream,
    peer: SocketAddr,
    path: Arc<str>,
    results: mpsc::UnboundedSender<CallbackResult>,
) {
    let target = match tokio::time::timeout(
        CONNECTION_READ_TIMEOUT,
        read_request_target(&mut socket),
    )
    .await
    {
        Ok(Ok(target)) => target,
        Ok(Err(error)) => {
            warn!(%peer, %error, "dropping malformed callback request");
            return;
        }
        Err(_) => {
            debug!(%peer, "closing idle callback connection");
            return;
        }
    };
    debug!(
        %peer,
        path = target.split('?').next().unwrap_or(""),
        "callback request"
    );

    let result = interpret_callback(&path, &target);
    respond(&mut socket, &result).await;
    if result != CallbackResult::Ignored && results.send(result).is_err() {
        debug!(%peer, "callback arrived after the listener finished");
    }
}

/// Split a redirect URI into a bindable `host:port` and the callback path.
pub fn redirect_target(redirect_uri: &str) -> Result<(String, String), AuthError> {
    let invalid = |reason: &str| AuthError::InvalidRedirectUri {
        uri: redirect_uri.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(redirect_uri).map_err(|error| invalid(&error.to_string()))?;
    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid("missing port"))?;
    let host = if host == "localhost" { "127.0.0.1" } else { host };
    Ok((format!("{host}:{port}"), url.path().to_string()))
}

/// Classify a request target (`/path?query`) against the callback path.
pub fn interpret_callback(callback_path: &str, target: &str) -> CallbackResult {
    let Ok(url) = Url::parse(&format!("http://callback.local{target}")) else {
        return CallbackResult::Ignored;
    };
    if url.path() != callback_path {
        return CallbackResult::Ignored;
    }

    let mut code = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match &*key {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" if !value.is_empty() => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (error, code) {
        (Some(error), _) => CallbackResult::Denied(error),
        (None, Some(code)) => CallbackResult::Code(code),
        (None, None) => CallbackResult::MissingCode,
    }
}

async fn read_request_target(socket: &mut TcpStream) -> std::io::Result<String> {
    let mut head = Vec::with_capacity(1024);
    let mut buffer = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = socket.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(&buffer[..read]);
        if head.len() > MAX_REQUEST_HEAD_BYTES {
            return Err(std::io::Error::other("request head too large"));
        }
    }

    let head = String::from_utf8_lossy(&head);
    let request_line = head.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => Ok(target.to_string()),
        _ => Err(std::io::Error::other(format!(
            "unsupported request line: {request_line:?}"
        ))),
    }
}

async fn respond(socket: &mut TcpStream, result: &CallbackResult) {
    let (status, title, message) = match result {
        CallbackResult::Code(_) => (
            "200 OK",
            "Authorization Successful",
            "You can close this window and return to the terminal.".to_string(),
        ),
        CallbackResult::Denied(reason) => (
            "200 OK",
            "Authorization Failed",
            format!("Authorization failed: {}", escape_html(reason)),
        ),
        CallbackResult::MissingCode => (
            "200 OK",
            "Authorization Failed",
            "No authorization code received".to_string(),
        ),
        CallbackResult::Ignored => ("404 Not Found", "Not Found", String::new()),
    };
    let body = format!("<html><body><h1>{title}</h1><p>{message}</p></body></html>");
    let response = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(error) = socket.write_all(response.as_bytes()).await {
        debug!(%error, "failed to answer callback request");
    }
    if let Err(error) = socket.shutdown().await {
        debug!(%error, "failed to close callback connection");
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
