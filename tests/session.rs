use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tesla_cli::menu::menu_text;
use tesla_cli::{Session, VehicleAction};
use vehicle_api::{CommandRequest, Vin, WakeState};
use vehicle_api_mock::{ChannelCall, ScriptedChannel, SubmitScript};
use wake_retry::{CancelSignal, DeliveryConfig, DeliveryPolicy, Sleeper, WakeRetryCoordinator};

const VIN: &str = "5YJ3E1EA7KF000001";

#[derive(Debug, Clone, Copy, Default)]
struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration, _cancel: Option<&CancelSignal>) {}
}

fn session(
    channel: &ScriptedChannel,
    policy: DeliveryPolicy,
) -> (Session<ScriptedChannel, InstantSleeper, Vec<u8>>, CancelSignal) {
    let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
    let coordinator = WakeRetryCoordinator::with_sleeper(channel.clone(), InstantSleeper, policy)
        .with_config(DeliveryConfig::default())
        .with_cancel_signal(Arc::clone(&cancel));
    let vin = Vin::new(VIN).expect("vin");
    (Session::new(coordinator, vin, Vec::new()), cancel)
}

fn output(session: Session<ScriptedChannel, InstantSleeper, Vec<u8>>) -> String {
    String::from_utf8(session.into_output()).expect("utf8 output")
}

fn submit(command: CommandRequest) -> ChannelCall {
    ChannelCall::Submit {
        vin: VIN.to_string(),
        command,
    }
}

#[test]
fn menu_locks_then_quits() {
    let channel = ScriptedChannel::new().with_states([WakeState::Awake]);
    let (mut session, _cancel) = session(&channel, DeliveryPolicy::default());

    session.run_menu(Cursor::new("1\n6\n")).expect("menu runs");

    assert_eq!(
        channel.calls(),
        vec![
            ChannelCall::Probe {
                vin: VIN.to_string()
            },
            submit(CommandRequest::door_lock()),
        ]
    );
    let text = output(session);
    assert!(text.contains("Locking doors...\nVehicle is awake\nDoors locked successfully!\n"));
    assert!(text.ends_with("Goodbye!\n"));
    assert_eq!(text.matches(&menu_text()).count(), 2);
}

#[test]
fn invalid_choices_reprompt_without_touching_vehicle() {
    let channel = ScriptedChannel::new();
    let (mut session, _cancel) = session(&channel, DeliveryPolicy::default());

    session.run_menu(Cursor::new("9\nlock\n6\n")).expect("menu runs");

    assert!(channel.calls().is_empty());
    let text = output(session);
    assert!(text.contains("Invalid choice '9'. Please enter 1-6."));
    assert!(text.contains("Invalid choice 'lock'. Please enter 1-6."));
    assert_eq!(text.matches(&menu_text()).count(), 3);
}

#[test]
fn end_of_input_quits() {
    let channel = ScriptedChannel::new();
    let (mut session, _cancel) = session(&channel, DeliveryPolicy::default());

    session.run_menu(Cursor::new("")).expect("menu runs");

    assert!(output(session).ends_with("Goodbye!\n"));
}

#[test]
fn sleeping_vehicle_is_woken_before_unlock() {
    let channel = ScriptedChannel::new().with_states([
        WakeState::Asleep,
        WakeState::Asleep,
        WakeState::Awake,
    ]);
    let (mut session, _cancel) = session(&channel, DeliveryPolicy::default());

    let delivered = session.run_action(VehicleAction::Unlock).expect("action runs");

    assert!(delivered);
    assert_eq!(channel.wake_count(), 1);
    assert_eq!(
        output(session),
        "Unlocking doors...\n\
         Vehicle is sleeping\n\
         Wake command sent\n\
         Vehicle is now awake!\n\
         Doors unlocked successfully!\n"
    );
}

#[test]
fn send_first_prints_retry_countdown() {
    let channel = ScriptedChannel::new().with_submits([
        SubmitScript::vehicle_unavailable(),
        SubmitScript::Delivered,
    ]);
    let (mut session, _cancel) = session(&channel, DeliveryPolicy::send_first());

    let delivered = session.run_action(VehicleAction::SentryOn).expect("action runs");

    assert!(delivered);
    assert_eq!(
        output(session),
        "Enabling Sentry Mode...\n\
         Wake command sent\n\
         Vehicle unavailable; retrying in 8 seconds\n\
         Resending command (attempt 2)\n\
         Sentry Mode enabled!\n"
    );
}

#[test]
fn rejection_is_reported_as_failure() {
    let channel = ScriptedChannel::new()
        .with_states([WakeState::Awake])
        .with_submits([SubmitScript::rejected(403, "forbidden")]);
    let (mut session, _cancel) = session(&channel, DeliveryPolicy::default());

    let delivered = session.run_action(VehicleAction::Lock).expect("action runs");

    assert!(!delivered);
    assert!(output(session).ends_with("Error: command failed with status 403: forbidden\n"));
}

#[test]
fn stale_cancel_flag_is_cleared_before_each_action() {
    let channel = ScriptedChannel::new().with_states([WakeState::Awake]);
    let (mut session, cancel) = session(&channel, DeliveryPolicy::default());
    cancel.store(true, Ordering::Release);

    let delivered = session.run_action(VehicleAction::Lock).expect("action runs");

    assert!(delivered);
    assert!(!cancel.load(Ordering::Acquire));
}

#[test]
fn wake_reports_unreachable_vehicle_without_failing() {
    let channel = ScriptedChannel::new().with_probe_fallback(
        vehicle_api_mock::ProbeScript::State(WakeState::Asleep),
    );
    let (mut session, _cancel) = session(&channel, DeliveryPolicy::default());

    session.initial_wake().expect("initial wake runs");

    assert_eq!(channel.submit_count(), 0);
    let text = output(session);
    assert!(text.starts_with(
        "Initial vehicle status check:\nVehicle is sleeping\nWake command sent\n"
    ));
    assert_eq!(text.matches("Still waiting...").count(), 12);
    assert!(text.contains(
        "Warning: Could not verify vehicle is awake: vehicle did not wake up after 60 attempts\n"
    ));
}

#[test]
fn status_prints_probe_result() {
    let channel = ScriptedChannel::new().with_states([WakeState::Asleep]);
    let (mut session, _cancel) = session(&channel, DeliveryPolicy::default());

    let state = session.status().expect("status runs");

    assert_eq!(state, Some(WakeState::Asleep));
    assert_eq!(output(session), format!("Vehicle {VIN} is asleep\n"));
}
