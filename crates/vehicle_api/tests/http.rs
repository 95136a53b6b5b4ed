use std::time::Duration;

use pretty_assertions::assert_eq;
use vehicle_api::headers::{build_headers, HEADER_AUTHORIZATION, HEADER_USER_AGENT};
use vehicle_api::{ChannelError, CommandRequest, ProxyChannel, ProxyConfig, Vin};

fn channel() -> ProxyChannel {
    let config = ProxyConfig::new("token-abc").with_base_url("https://localhost:4443/");
    ProxyChannel::new(config).expect("channel")
}

fn vin() -> Vin {
    Vin::new("5YJ3E1EA7KF000001").expect("vin")
}

#[test]
fn probe_request_targets_vehicle_endpoint() {
    let request = channel()
        .build_probe_request(&vin())
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(request.method(), "GET");
    assert_eq!(
        request.url().as_str(),
        "https://localhost:4443/api/1/vehicles/5YJ3E1EA7KF000001"
    );
    assert_eq!(
        request.headers()[HEADER_AUTHORIZATION].to_str().expect("ascii"),
        "Bearer token-abc"
    );
}

#[test]
fn wake_request_is_bodyless_post() {
    let request = channel()
        .build_wake_request(&vin())
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(request.method(), "POST");
    assert!(request.url().path().ends_with("/5YJ3E1EA7KF000001/wake_up"));
    assert!(request.body().is_none());
    assert!(request.headers().contains_key(HEADER_AUTHORIZATION));
}

#[test]
fn submit_request_posts_json_parameters() {
    let request = channel()
        .build_submit_request(&vin(), &CommandRequest::set_sentry_mode(true))
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(request.method(), "POST");
    assert_eq!(
        request.url().path(),
        "/api/1/vehicles/5YJ3E1EA7KF000001/command/set_sentry_mode"
    );
    let body = request
        .body()
        .and_then(|body| body.as_bytes())
        .expect("buffered body");
    let value: serde_json::Value = serde_json::from_slice(body).expect("json body");
    assert_eq!(value, serde_json::json!({"on": true}));
}

#[test]
fn submit_without_parameters_sends_empty_object() {
    let request = channel()
        .build_submit_request(&vin(), &CommandRequest::door_unlock())
        .expect("build request")
        .build()
        .expect("request");

    let body = request
        .body()
        .and_then(|body| body.as_bytes())
        .expect("buffered body");
    assert_eq!(body, b"{}");
}

#[test]
fn channel_requires_access_token() {
    let error = ProxyChannel::new(ProxyConfig::new("  ")).unwrap_err();
    assert!(matches!(error, ChannelError::MissingAccessToken));
}

#[test]
fn channel_refuses_plain_http_proxy() {
    let config = ProxyConfig::new("token").with_base_url("http://localhost:4443");
    let error = ProxyChannel::new(config).unwrap_err();
    assert!(matches!(error, ChannelError::InsecureScheme { .. }));
}

#[test]
fn config_defaults_match_local_proxy() {
    let config = ProxyConfig::new("token");
    assert_eq!(config.base_url, "https://localhost:4443");
    assert_eq!(config.timeout, Duration::from_secs(10));
    assert!(config.accept_invalid_certs);
}

#[test]
fn user_agent_override_is_used() {
    let config = ProxyConfig::new("token").with_user_agent("garage-bot/1.0");
    let headers = build_headers(&config).expect("headers");
    assert_eq!(headers[HEADER_USER_AGENT], "garage-bot/1.0");
}
