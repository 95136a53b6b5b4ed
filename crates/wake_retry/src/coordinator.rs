use std::time::Duration;

use tracing::{debug, info, warn};
use vehicle_api::{
    ChannelError, CommandRequest, Rejection, SubmitResult, VehicleCommandChannel, Vin, WakeState,
};

use crate::outcome::{AbortReason, DeliveryOutcome, DeliveryProgress, WakeOutcome};
use crate::policy::DeliveryPolicy;
use crate::schedule::{ProbeBeforeSendSchedule, SendFirstSchedule};
use crate::sleeper::{is_cancelled, CancelSignal, Sleeper, ThreadSleeper};

/// Wall-clock length of one schedule unit by default.
pub const DEFAULT_TIME_UNIT: Duration = Duration::from_secs(1);

/// Timing knobs shared by both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Length of one schedule unit.
    pub time_unit: Duration,
    /// Optional ceiling on the units a single call may spend waiting.
    pub max_wait_units: Option<u64>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            time_unit: DEFAULT_TIME_UNIT,
            max_wait_units: None,
        }
    }
}

impl DeliveryConfig {
    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    pub fn with_max_wait_units(mut self, units: u64) -> Self {
        self.max_wait_units = Some(units);
        self
    }
}

/// Delivers commands to one vehicle through a channel, waking it as needed.
///
/// `deliver` borrows the coordinator mutably, so one instance never has more
/// than one command in flight. Instances share nothing; run one per vehicle.
#[derive(Debug)]
pub struct WakeRetryCoordinator<C, S = ThreadSleeper> {
    channel: C,
    sleeper: S,
    policy: DeliveryPolicy,
    config: DeliveryConfig,
    cancel: Option<CancelSignal>,
}

impl<C: VehicleCommandChannel> WakeRetryCoordinator<C, ThreadSleeper> {
    pub fn new(channel: C, policy: DeliveryPolicy) -> Self {
        Self::with_sleeper(channel, ThreadSleeper, policy)
    }
}

impl<C: VehicleCommandChannel, S: Sleeper> WakeRetryCoordinator<C, S> {
    pub fn with_sleeper(channel: C, sleeper: S, policy: DeliveryPolicy) -> Self {
        Self {
            channel,
            sleeper,
            policy,
            config: DeliveryConfig::default(),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DeliveryConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DeliveryPolicy) {
        self.policy = policy;
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    pub fn cancel_signal(&self) -> Option<&CancelSignal> {
        self.cancel.as_ref()
    }

    pub fn deliver(&mut self, vin: &Vin, command: &CommandRequest) -> DeliveryOutcome {
        self.deliver_with_handler(vin, command, |_| {})
    }

    pub fn deliver_with_handler<F>(
        &mut self,
        vin: &Vin,
        command: &CommandRequest,
        on_progress: F,
    ) -> DeliveryOutcome
    where
        F: FnMut(DeliveryProgress),
    {
        info!(%vin, command = command.name(), policy = %self.policy, "delivering command");
        let policy = self.policy;
        let mut run = DeliveryRun::new(self, on_progress);
        let outcome = match policy {
            DeliveryPolicy::ProbeBeforeSend(schedule) => {
                run.probe_before_send(vin, command, &schedule)
            }
            DeliveryPolicy::SendFirst(schedule) => run.send_first(vin, command, &schedule),
        };
        info!(
            %vin,
            command = command.name(),
            outcome = %outcome,
            elapsed_units = run.elapsed_units,
            "delivery finished"
        );
        outcome
    }

    /// Bring the vehicle online without submitting anything.
    pub fn ensure_awake(&mut self, vin: &Vin) -> WakeOutcome {
        self.ensure_awake_with_handler(vin, |_| {})
    }

    pub fn ensure_awake_with_handler<F>(&mut self, vin: &Vin, on_progress: F) -> WakeOutcome
    where
        F: FnMut(DeliveryProgress),
    {
        let schedule = self.policy.poll_schedule();
        let mut run = DeliveryRun::new(self, on_progress);
        run.ensure_awake(vin, &schedule)
    }
}

/// Per-call state: elapsed wait units and the progress sink.
struct DeliveryRun<'a, C, S, F> {
    channel: &'a C,
    sleeper: &'a S,
    config: DeliveryConfig,
    cancel: Option<&'a CancelSignal>,
    on_progress: F,
    elapsed_units: u64,
}

impl<'a, C, S, F> DeliveryRun<'a, C, S, F>
where
    C: VehicleCommandChannel,
    S: Sleeper,
    F: FnMut(DeliveryProgress),
{
    fn new(coordinator: &'a WakeRetryCoordinator<C, S>, on_progress: F) -> Self {
        Self {
            channel: &coordinator.channel,
            sleeper: &coordinator.sleeper,
            config: coordinator.config,
            cancel: coordinator.cancel.as_ref(),
            on_progress,
            elapsed_units: 0,
        }
    }

    fn emit(&mut self, progress: DeliveryProgress) {
        (self.on_progress)(progress);
    }

    fn check_cancelled(&self) -> Result<(), AbortReason> {
        if is_cancelled(self.cancel) {
            Err(AbortReason::Cancelled)
        } else {
            Ok(())
        }
    }

    fn wait(&mut self, units: u64) -> Result<(), AbortReason> {
        self.check_cancelled()?;
        if let Some(budget) = self.config.max_wait_units {
            if self.elapsed_units + units > budget {
                warn!(
                    elapsed_units = self.elapsed_units,
                    wait_units = units,
                    budget,
                    "wait budget exhausted"
                );
                return Err(AbortReason::DeadlineExceeded);
            }
        }

        let duration = self
            .config
            .time_unit
            .saturating_mul(u32::try_from(units).unwrap_or(u32::MAX));
        self.sleeper.sleep(duration, self.cancel);
        self.elapsed_units += units;
        self.check_cancelled()
    }

    fn submit(
        &mut self,
        vin: &Vin,
        command: &CommandRequest,
        attempt: u32,
    ) -> Result<SubmitResult, ChannelError> {
        self.emit(DeliveryProgress::Submitting { attempt });
        self.channel.submit(vin, command)
    }

    fn probe_before_send(
        &mut self,
        vin: &Vin,
        command: &CommandRequest,
        schedule: &ProbeBeforeSendSchedule,
    ) -> DeliveryOutcome {
        match self.ensure_awake(vin, schedule) {
            WakeOutcome::Awake { .. } => {}
            WakeOutcome::Unreachable {
                attempts,
                elapsed_units,
            } => {
                return DeliveryOutcome::VehicleUnreachable {
                    attempts,
                    elapsed_units,
                }
            }
            WakeOutcome::TransportError(error) => return DeliveryOutcome::TransportError(error),
            WakeOutcome::Aborted(reason) => return DeliveryOutcome::Aborted(reason),
        }

        if let Err(reason) = self.check_cancelled() {
            return DeliveryOutcome::Aborted(reason);
        }
        submit_outcome(self.submit(vin, command, 1))
    }

    fn ensure_awake(&mut self, vin: &Vin, schedule: &ProbeBeforeSendSchedule) -> WakeOutcome {
        if let Err(reason) = self.check_cancelled() {
            return WakeOutcome::Aborted(reason);
        }

        let state = match self.channel.probe_wake_state(vin) {
            Ok(state) => state,
            Err(error) => {
                warn!(%vin, %error, "wake state probe failed; waking anyway");
                WakeState::Unknown
            }
        };
        self.emit(DeliveryProgress::WakeStateProbed { state });
        if state.is_awake() {
            return WakeOutcome::Awake {
                poll_attempts: 0,
                elapsed_units: self.elapsed_units,
            };
        }

        if let Err(error) = self.channel.request_wake(vin) {
            warn!(%vin, %error, "wake request failed");
            return WakeOutcome::TransportError(error);
        }
        self.emit(DeliveryProgress::WakeRequested {
            attempt: 1,
            accepted: true,
        });
        info!(%vin, "wake requested; polling until online");

        for index in 0..schedule.max_poll_attempts {
            let wait_units = schedule.poll_wait_units(index);
            if let Err(reason) = self.wait(wait_units) {
                return WakeOutcome::Aborted(reason);
            }

            let attempt = index + 1;
            let state = match self.channel.probe_wake_state(vin) {
                Ok(state) => state,
                Err(error) => {
                    debug!(%vin, attempt, %error, "poll probe failed");
                    WakeState::Unknown
                }
            };
            debug!(%vin, attempt, wait_units, state = %state, "polled wake state");

            if state.is_awake() {
                self.emit(DeliveryProgress::VehicleAwake {
                    attempts: attempt,
                    elapsed_units: self.elapsed_units,
                });
                info!(%vin, attempt, elapsed_units = self.elapsed_units, "vehicle is online");
                return WakeOutcome::Awake {
                    poll_attempts: attempt,
                    elapsed_units: self.elapsed_units,
                };
            }

            if schedule.reports_progress_at(attempt) {
                self.emit(DeliveryProgress::StillWaiting {
                    attempt,
                    elapsed_units: self.elapsed_units,
                    state,
                });
            }
        }

        warn!(%vin, attempts = schedule.max_poll_attempts, "vehicle did not wake up");
        WakeOutcome::Unreachable {
            attempts: schedule.max_poll_attempts,
            elapsed_units: self.elapsed_units,
        }
    }

    fn send_first(
        &mut self,
        vin: &Vin,
        command: &CommandRequest,
        schedule: &SendFirstSchedule,
    ) -> DeliveryOutcome {
        if let Err(reason) = self.check_cancelled() {
            return DeliveryOutcome::Aborted(reason);
        }
        let mut last = self.submit(vin, command, 1);

        for retry in 1..=schedule.max_resubmits {
            let rejection = match last {
                Ok(SubmitResult::Rejected(rejection)) if rejection.is_vehicle_unavailable() => {
                    rejection
                }
                other => return submit_outcome(other),
            };
            debug!(
                %vin,
                retry,
                status = rejection.status,
                "vehicle unavailable; waking before resubmit"
            );

            if let Err(reason) = self.wake_burst(vin, schedule) {
                return DeliveryOutcome::Aborted(reason);
            }

            let wait_units = schedule.resubmit_wait_units(retry);
            self.emit(DeliveryProgress::RetryScheduled {
                attempt: retry,
                wait_units,
            });
            if let Err(reason) = self.wait(wait_units) {
                return DeliveryOutcome::Aborted(reason);
            }

            last = self.submit(vin, command, retry + 1);
        }

        submit_outcome(last)
    }

    /// Fire wake triggers until one is accepted, ignoring failures.
    fn wake_burst(&mut self, vin: &Vin, schedule: &SendFirstSchedule) -> Result<(), AbortReason> {
        for attempt in 1..=schedule.wake_attempts {
            if attempt > 1 {
                self.wait(schedule.wake_spacing_units)?;
            }
            match self.channel.request_wake(vin) {
                Ok(()) => {
                    self.emit(DeliveryProgress::WakeRequested {
                        attempt,
                        accepted: true,
                    });
                    return Ok(());
                }
                Err(error) => {
                    warn!(%vin, attempt, %error, "wake request failed; continuing");
                    self.emit(DeliveryProgress::WakeRequested {
                        attempt,
                        accepted: false,
                    });
                }
            }
        }
        Ok(())
    }
}

fn submit_outcome(result: Result<SubmitResult, ChannelError>) -> DeliveryOutcome {
    match result {
        Ok(SubmitResult::Delivered) => DeliveryOutcome::Delivered,
        Ok(SubmitResult::Rejected(Rejection { status, body })) => {
            DeliveryOutcome::RejectedByServer { status, body }
        }
        Err(error) => DeliveryOutcome::TransportError(error),
    }
}
