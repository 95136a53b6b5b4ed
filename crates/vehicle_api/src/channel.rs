use std::fmt;

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder};
use tokio::runtime::Runtime;
use tracing::debug;
use url::Url;

use crate::config::ProxyConfig;
use crate::error::ChannelError;
use crate::headers::{build_headers, to_header_map};
use crate::payload::CommandRequest;
use crate::response::{classify_probe, classify_submit, classify_wake, SubmitResult};
use crate::url::{command_url, normalize_proxy_base_url, vehicle_url, wake_up_url};
use crate::vehicle::{Vin, WakeState};

/// The three proxy operations the delivery protocol is built on.
///
/// Implementations hold no state between calls beyond their connection
/// configuration, and `request_wake` must be safe to fire repeatedly.
pub trait VehicleCommandChannel {
    /// Read the vehicle's current reachability.
    fn probe_wake_state(&self, vin: &Vin) -> Result<WakeState, ChannelError>;

    /// Ask the vehicle to wake. Does not wait for it to come online.
    fn request_wake(&self, vin: &Vin) -> Result<(), ChannelError>;

    /// Submit a named command.
    fn submit(&self, vin: &Vin, command: &CommandRequest) -> Result<SubmitResult, ChannelError>;
}

impl<T: VehicleCommandChannel + ?Sized> VehicleCommandChannel for &T {
    fn probe_wake_state(&self, vin: &Vin) -> Result<WakeState, ChannelError> {
        (**self).probe_wake_state(vin)
    }

    fn request_wake(&self, vin: &Vin) -> Result<(), ChannelError> {
        (**self).request_wake(vin)
    }

    fn submit(&self, vin: &Vin, command: &CommandRequest) -> Result<SubmitResult, ChannelError> {
        (**self).submit(vin, command)
    }
}

impl<T: VehicleCommandChannel + ?Sized> VehicleCommandChannel for Box<T> {
    fn probe_wake_state(&self, vin: &Vin) -> Result<WakeState, ChannelError> {
        (**self).probe_wake_state(vin)
    }

    fn request_wake(&self, vin: &Vin) -> Result<(), ChannelError> {
        (**self).request_wake(vin)
    }

    fn submit(&self, vin: &Vin, command: &CommandRequest) -> Result<SubmitResult, ChannelError> {
        (**self).submit(vin, command)
    }
}

/// reqwest-backed channel toward the local HTTPS command proxy.
///
/// Calls are blocking from the caller's side: each request runs to completion
/// on a private current-thread runtime.
pub struct ProxyChannel {
    http: Client,
    runtime: Runtime,
    base_url: Url,
    headers: HeaderMap,
    config: ProxyConfig,
}

impl fmt::Debug for ProxyChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyChannel")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.config.timeout)
            .field("accept_invalid_certs", &self.config.accept_invalid_certs)
            .finish_non_exhaustive()
    }
}

impl ProxyChannel {
    pub fn new(config: ProxyConfig) -> Result<Self, ChannelError> {
        let headers = to_header_map(&build_headers(&config)?)?;
        let base_url = normalize_proxy_base_url(&config.base_url)?;
        let http = Client::builder()
            .https_only(true)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.timeout)
            .build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| ChannelError::Runtime(error.to_string()))?;

        Ok(Self {
            http,
            runtime,
            base_url,
            headers,
            config,
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn build_probe_request(&self, vin: &Vin) -> Result<RequestBuilder, ChannelError> {
        Ok(self
            .http
            .get(vehicle_url(&self.base_url, vin)?)
            .headers(self.headers.clone()))
    }

    pub fn build_wake_request(&self, vin: &Vin) -> Result<RequestBuilder, ChannelError> {
        Ok(self
            .http
            .post(wake_up_url(&self.base_url, vin)?)
            .headers(self.headers.clone()))
    }

    pub fn build_submit_request(
        &self,
        vin: &Vin,
        command: &CommandRequest,
    ) -> Result<RequestBuilder, ChannelError> {
        Ok(self
            .http
            .post(command_url(&self.base_url, vin, command.name())?)
            .headers(self.headers.clone())
            .json(&command.body()))
    }

    fn execute(&self, request: RequestBuilder) -> Result<(u16, String), ChannelError> {
        self.runtime.block_on(async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, ChannelError>((status, body))
        })
    }
}

impl VehicleCommandChannel for ProxyChannel {
    fn probe_wake_state(&self, vin: &Vin) -> Result<WakeState, ChannelError> {
        let (status, body) = self.execute(self.build_probe_request(vin)?)?;
        let state = classify_probe(status, &body)?;
        debug!(%vin, status, state = %state, "probed vehicle state");
        Ok(state)
    }

    fn request_wake(&self, vin: &Vin) -> Result<(), ChannelError> {
        let (status, body) = self.execute(self.build_wake_request(vin)?)?;
        debug!(%vin, status, "wake trigger answered");
        classify_wake(status, &body)
    }

    fn submit(&self, vin: &Vin, command: &CommandRequest) -> Result<SubmitResult, ChannelError> {
        let (status, body) = self.execute(self.build_submit_request(vin, command)?)?;
        debug!(%vin, command = command.name(), status, "command answered");
        Ok(classify_submit(status, &body))
    }
}
