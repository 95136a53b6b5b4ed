use pretty_assertions::assert_eq;
use vehicle_api::response::{classify_probe, classify_submit, classify_wake};
use vehicle_api::{ChannelError, Rejection, SubmitResult, WakeState};

#[test]
fn probe_error_field_means_asleep_for_any_status() {
    let body = r#"{"error":"vehicle unavailable: vehicle is offline or asleep"}"#;
    for status in [200, 404, 408, 500, 503] {
        assert_eq!(
            classify_probe(status, body).expect("error body should classify"),
            WakeState::Asleep,
            "status {status}"
        );
    }
}

#[test]
fn probe_object_error_field_means_asleep() {
    let body = r#"{"error":{"code":"offline"}}"#;
    assert_eq!(classify_probe(408, body).expect("probe"), WakeState::Asleep);
}

#[test]
fn probe_online_state_means_awake() {
    let body = r#"{"response":{"id":1,"state":"online","vin":"X"}}"#;
    assert_eq!(classify_probe(200, body).expect("probe"), WakeState::Awake);
    assert_eq!(classify_probe(204, body).expect("probe"), WakeState::Awake);
}

#[test]
fn probe_other_or_missing_state_means_asleep() {
    for body in [
        r#"{"response":{"state":"asleep"}}"#,
        r#"{"response":{"state":"offline"}}"#,
        r#"{"response":{"state":"ONLINE"}}"#,
        r#"{"response":{"state":1}}"#,
        r#"{"response":{}}"#,
        r#"{"response":null}"#,
        r#"{}"#,
    ] {
        assert_eq!(
            classify_probe(200, body).expect("probe"),
            WakeState::Asleep,
            "body {body}"
        );
    }
}

#[test]
fn probe_non_success_without_error_is_transport_failure() {
    let error = classify_probe(502, r#"{"response":{"state":"online"}}"#).unwrap_err();
    assert!(matches!(error, ChannelError::Status { status: 502, .. }));
    assert_eq!(error.status(), Some(502));
}

#[test]
fn probe_unparseable_success_is_parse_failure() {
    assert!(matches!(
        classify_probe(200, "<html>proxy</html>"),
        Err(ChannelError::Parse(_))
    ));
}

#[test]
fn probe_unparseable_failure_keeps_status_and_body() {
    match classify_probe(500, "upstream exploded") {
        Err(ChannelError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("unexpected probe classification: {other:?}"),
    }
}

#[test]
fn wake_accepts_any_success_status() {
    assert!(classify_wake(200, "").is_ok());
    assert!(classify_wake(202, r#"{"response":{"state":"asleep"}}"#).is_ok());
    assert!(matches!(
        classify_wake(401, "unauthorized"),
        Err(ChannelError::Status { status: 401, .. })
    ));
}

#[test]
fn submit_success_is_delivered_regardless_of_body() {
    assert_eq!(classify_submit(200, "anything"), SubmitResult::Delivered);
    assert_eq!(
        classify_submit(200, r#"{"response":{"result":false}}"#),
        SubmitResult::Delivered
    );
}

#[test]
fn submit_failure_keeps_status_and_raw_body() {
    let body = r#"{"error":"vehicle unavailable: vehicle is offline or asleep"}"#;
    let SubmitResult::Rejected(rejection) = classify_submit(408, body) else {
        panic!("non-success submit must be a rejection");
    };
    assert_eq!(rejection, Rejection::new(408, body));
    assert!(rejection.is_vehicle_unavailable());
}

#[test]
fn unrelated_rejection_is_not_asleep_signature() {
    let rejection = Rejection::new(403, r#"{"error":"missing vehicle_cmds scope"}"#);
    assert!(!rejection.is_vehicle_unavailable());
}
