mod support;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vehicle_api::{CommandRequest, WakeState};
use vehicle_api_mock::{ProbeScript, ScriptedChannel, SubmitScript};
use wake_retry::{AbortReason, CancelSignal, DeliveryOutcome, DeliveryPolicy, WakeRetryCoordinator};

use support::{test_config, vin, RecordingSleeper};

fn asleep_forever() -> ScriptedChannel {
    ScriptedChannel::new().with_probe_fallback(ProbeScript::State(WakeState::Asleep))
}

#[test]
fn cancel_before_delivery_touches_nothing() {
    let channel = asleep_forever();
    let cancel: CancelSignal = Arc::new(AtomicBool::new(true));
    let mut coordinator = WakeRetryCoordinator::with_sleeper(
        channel.clone(),
        RecordingSleeper::new(),
        DeliveryPolicy::probe_before_send(),
    )
    .with_config(test_config())
    .with_cancel_signal(cancel);

    let outcome = coordinator.deliver(&vin(), &CommandRequest::door_lock());

    assert!(matches!(
        outcome,
        DeliveryOutcome::Aborted(AbortReason::Cancelled)
    ));
    assert!(channel.calls().is_empty());
}

#[test]
fn cancel_during_poll_stops_waiting() {
    let channel = asleep_forever();
    let sleeper = RecordingSleeper::cancelling_after(3);
    let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
    let mut coordinator = WakeRetryCoordinator::with_sleeper(
        channel.clone(),
        sleeper.clone(),
        DeliveryPolicy::probe_before_send(),
    )
    .with_config(test_config())
    .with_cancel_signal(Arc::clone(&cancel));

    let outcome = coordinator.deliver(&vin(), &CommandRequest::door_lock());

    assert!(matches!(
        outcome,
        DeliveryOutcome::Aborted(AbortReason::Cancelled)
    ));
    assert!(cancel.load(Ordering::Acquire));
    assert_eq!(sleeper.waits().len(), 3);
    // Initial probe plus the two polls that completed before the third wait.
    assert_eq!(channel.probe_count(), 3);
    assert_eq!(channel.submit_count(), 0);
}

#[test]
fn wait_budget_bounds_polling() {
    let channel = asleep_forever();
    let sleeper = RecordingSleeper::new();
    let mut coordinator = WakeRetryCoordinator::with_sleeper(
        channel.clone(),
        sleeper.clone(),
        DeliveryPolicy::probe_before_send(),
    )
    .with_config(test_config().with_max_wait_units(12));

    let outcome = coordinator.deliver(&vin(), &CommandRequest::door_lock());

    assert!(matches!(
        outcome,
        DeliveryOutcome::Aborted(AbortReason::DeadlineExceeded)
    ));
    // 1+1+1+1+1+2+2+2 = 11; the next 2-unit wait would exceed 12.
    assert_eq!(sleeper.wait_units(), vec![1, 1, 1, 1, 1, 2, 2, 2]);
}

#[test]
fn wait_budget_bounds_resubmits() {
    let channel = ScriptedChannel::new().with_submit_fallback(SubmitScript::vehicle_unavailable());
    let sleeper = RecordingSleeper::new();
    let mut coordinator = WakeRetryCoordinator::with_sleeper(
        channel.clone(),
        sleeper.clone(),
        DeliveryPolicy::send_first(),
    )
    .with_config(test_config().with_max_wait_units(20));

    let outcome = coordinator.deliver(&vin(), &CommandRequest::door_lock());

    assert!(matches!(
        outcome,
        DeliveryOutcome::Aborted(AbortReason::DeadlineExceeded)
    ));
    assert_eq!(sleeper.wait_units(), vec![8, 11]);
    assert_eq!(channel.submit_count(), 3);
}

#[test]
fn independent_coordinators_do_not_share_state() {
    let first = ScriptedChannel::new().with_states([WakeState::Awake]);
    let second = asleep_forever();
    let cancel_second: CancelSignal = Arc::new(AtomicBool::new(true));

    let mut a = WakeRetryCoordinator::with_sleeper(
        first.clone(),
        RecordingSleeper::new(),
        DeliveryPolicy::probe_before_send(),
    )
    .with_config(test_config());
    let mut b = WakeRetryCoordinator::with_sleeper(
        second.clone(),
        RecordingSleeper::new(),
        DeliveryPolicy::probe_before_send(),
    )
    .with_config(test_config())
    .with_cancel_signal(cancel_second);

    assert!(b.deliver(&vin(), &CommandRequest::door_lock()).to_string().contains("cancelled"));
    assert!(a.deliver(&vin(), &CommandRequest::door_lock()).is_delivered());
    assert_eq!(first.submit_count(), 1);
    assert_eq!(second.submit_count(), 0);
}
