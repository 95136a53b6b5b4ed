//! Deterministic scripted implementation of [`VehicleCommandChannel`].
//!
//! This crate contains no transport logic. Each operation replays a queue of
//! canned results and records every call, so delivery policies can be checked
//! call-by-call without a proxy.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use vehicle_api::{
    ChannelError, CommandRequest, Rejection, SubmitResult, VehicleCommandChannel, Vin, WakeState,
};

/// One recorded channel call.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelCall {
    Probe { vin: String },
    Wake { vin: String },
    Submit { vin: String, command: CommandRequest },
}

/// Canned answer for a probe call.
#[derive(Debug, Clone)]
pub enum ProbeScript {
    State(WakeState),
    TransportFailure(String),
}

/// Canned answer for a wake call.
#[derive(Debug, Clone)]
pub enum WakeScript {
    Accepted,
    TransportFailure(String),
}

/// Canned answer for a submit call.
#[derive(Debug, Clone)]
pub enum SubmitScript {
    Delivered,
    Rejected { status: u16, body: String },
    TransportFailure(String),
}

impl SubmitScript {
    /// The proxy's answer for a command sent to a sleeping vehicle.
    pub fn vehicle_unavailable() -> Self {
        Self::Rejected {
            status: 408,
            body: r#"{"error":"vehicle unavailable: vehicle is offline or asleep"}"#.to_string(),
        }
    }

    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ChannelTrace {
    pub calls: Vec<ChannelCall>,
    probes: VecDeque<ProbeScript>,
    wakes: VecDeque<WakeScript>,
    submits: VecDeque<SubmitScript>,
    probe_fallback: Option<ProbeScript>,
    wake_fallback: Option<WakeScript>,
    submit_fallback: Option<SubmitScript>,
}

impl ChannelTrace {
    pub fn probe_count(&self) -> usize {
        self.count(|call| matches!(call, ChannelCall::Probe { .. }))
    }

    pub fn wake_count(&self) -> usize {
        self.count(|call| matches!(call, ChannelCall::Wake { .. }))
    }

    pub fn submit_count(&self) -> usize {
        self.count(|call| matches!(call, ChannelCall::Submit { .. }))
    }

    fn count(&self, predicate: impl Fn(&ChannelCall) -> bool) -> usize {
        self.calls.iter().filter(|&call| predicate(call)).count()
    }
}

/// Scripted channel. Queued answers are consumed in order; once a queue is
/// empty the operation's fallback answer repeats.
///
/// Default fallbacks: probes report `Awake`, wakes are accepted, submits are
/// delivered.
#[derive(Debug, Clone)]
pub struct ScriptedChannel {
    state: Arc<Mutex<ChannelTrace>>,
}

impl Default for ScriptedChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChannelTrace::default())),
        }
    }

    /// Shared handle to the recorded calls.
    pub fn trace(&self) -> Arc<Mutex<ChannelTrace>> {
        Arc::clone(&self.state)
    }

    #[must_use]
    pub fn with_probes(self, probes: impl IntoIterator<Item = ProbeScript>) -> Self {
        lock_unpoisoned(&self.state).probes.extend(probes);
        self
    }

    #[must_use]
    pub fn with_states(self, states: impl IntoIterator<Item = WakeState>) -> Self {
        self.with_probes(states.into_iter().map(ProbeScript::State))
    }

    #[must_use]
    pub fn with_wakes(self, wakes: impl IntoIterator<Item = WakeScript>) -> Self {
        lock_unpoisoned(&self.state).wakes.extend(wakes);
        self
    }

    #[must_use]
    pub fn with_submits(self, submits: impl IntoIterator<Item = SubmitScript>) -> Self {
        lock_unpoisoned(&self.state).submits.extend(submits);
        self
    }

    #[must_use]
    pub fn with_probe_fallback(self, script: ProbeScript) -> Self {
        lock_unpoisoned(&self.state).probe_fallback = Some(script);
        self
    }

    #[must_use]
    pub fn with_wake_fallback(self, script: WakeScript) -> Self {
        lock_unpoisoned(&self.state).wake_fallback = Some(script);
        self
    }

    #[must_use]
    pub fn with_submit_fallback(self, script: SubmitScript) -> Self {
        lock_unpoisoned(&self.state).submit_fallback = Some(script);
        self
    }

    pub fn calls(&self) -> Vec<ChannelCall> {
        lock_unpoisoned(&self.state).calls.clone()
    }

    pub fn probe_count(&self) -> usize {
        lock_unpoisoned(&self.state).probe_count()
    }

    pub fn wake_count(&self) -> usize {
        lock_unpoisoned(&self.state).wake_count()
    }

    pub fn submit_count(&self) -> usize {
        lock_unpoisoned(&self.state).submit_count()
    }
}

impl VehicleCommandChannel for ScriptedChannel {
    fn probe_wake_state(&self, vin: &Vin) -> Result<WakeState, ChannelError> {
        let mut state = lock_unpoisoned(&self.state);
        state.calls.push(ChannelCall::Probe {
            vin: vin.to_string(),
        });
        let script = state
            .probes
            .pop_front()
            .or_else(|| state.probe_fallback.clone())
            .unwrap_or(ProbeScript::State(WakeState::Awake));
        match script {
            ProbeScript::State(wake_state) => Ok(wake_state),
            ProbeScript::TransportFailure(message) => Err(transport_failure(message)),
        }
    }

    fn request_wake(&self, vin: &Vin) -> Result<(), ChannelError> {
        let mut state = lock_unpoisoned(&self.state);
        state.calls.push(ChannelCall::Wake {
            vin: vin.to_string(),
        });
        let script = state
            .wakes
            .pop_front()
            .or_else(|| state.wake_fallback.clone())
            .unwrap_or(WakeScript::Accepted);
        match script {
            WakeScript::Accepted => Ok(()),
            WakeScript::TransportFailure(message) => Err(transport_failure(message)),
        }
    }

    fn submit(&self, vin: &Vin, command: &CommandRequest) -> Result<SubmitResult, ChannelError> {
        let mut state = lock_unpoisoned(&self.state);
        state.calls.push(ChannelCall::Submit {
            vin: vin.to_string(),
            command: command.clone(),
        });
        let script = state
            .submits
            .pop_front()
            .or_else(|| state.submit_fallback.clone())
            .unwrap_or(SubmitScript::Delivered);
        match script {
            SubmitScript::Delivered => Ok(SubmitResult::Delivered),
            SubmitScript::Rejected { status, body } => {
                Ok(SubmitResult::Rejected(Rejection::new(status, body)))
            }
            SubmitScript::TransportFailure(message) => Err(transport_failure(message)),
        }
    }
}

/// Scripted transport failures surface as a 599 status error so tests can
/// tell them apart from real proxy answers.
fn transport_failure(message: String) -> ChannelError {
    ChannelError::Status {
        status: 599,
        body: message,
    }
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
