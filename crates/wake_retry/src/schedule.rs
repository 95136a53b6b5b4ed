/// Poll attempts after a wake request before giving up.
pub const MAX_POLL_ATTEMPTS: u32 = 60;
/// Poll wait grows by one unit every this many attempts.
pub const POLL_STEP_EVERY: u32 = 5;
/// Upper bound on a single poll wait.
pub const MAX_POLL_WAIT_UNITS: u64 = 5;
/// Progress is reported every this many poll attempts.
pub const PROGRESS_EVERY: u32 = 5;

/// Resubmissions after the first send-first attempt.
pub const MAX_RESUBMITS: u32 = 3;
/// Wake triggers fired per burst until one is accepted.
pub const WAKE_BURST_ATTEMPTS: u32 = 3;
/// Spacing between wake triggers inside a burst.
pub const WAKE_BURST_SPACING_UNITS: u64 = 1;
/// Resubmit wait is `RESUBMIT_BASE_UNITS + RESUBMIT_STEP_UNITS * k`.
pub const RESUBMIT_BASE_UNITS: u64 = 5;
pub const RESUBMIT_STEP_UNITS: u64 = 3;

/// Wait before poll attempt `attempt_index` (0-based) with default tuning.
pub fn poll_wait_units(attempt_index: u32) -> u64 {
    ProbeBeforeSendSchedule::default().poll_wait_units(attempt_index)
}

/// Wait before resubmission `retry` (1-based) with default tuning.
pub fn resubmit_wait_units(retry: u32) -> u64 {
    SendFirstSchedule::default().resubmit_wait_units(retry)
}

/// Tuning for the probe-before-send strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeBeforeSendSchedule {
    pub max_poll_attempts: u32,
    pub step_every: u32,
    pub max_wait_units: u64,
    pub progress_every: u32,
}

impl Default for ProbeBeforeSendSchedule {
    fn default() -> Self {
        Self {
            max_poll_attempts: MAX_POLL_ATTEMPTS,
            step_every: POLL_STEP_EVERY,
            max_wait_units: MAX_POLL_WAIT_UNITS,
            progress_every: PROGRESS_EVERY,
        }
    }
}

impl ProbeBeforeSendSchedule {
    /// `min(1 + attempt_index / step_every, max_wait_units)`.
    pub fn poll_wait_units(&self, attempt_index: u32) -> u64 {
        let step = u64::from(attempt_index / self.step_every.max(1));
        (1 + step).min(self.max_wait_units.max(1))
    }

    /// Whether progress should be reported after poll attempt `attempt` (1-based).
    pub fn reports_progress_at(&self, attempt: u32) -> bool {
        self.progress_every > 0 && attempt % self.progress_every == 0
    }

    /// Sum of every poll wait, i.e. the longest a wake can take in units.
    pub fn total_poll_units(&self) -> u64 {
        (0..self.max_poll_attempts)
            .map(|index| self.poll_wait_units(index))
            .sum()
    }
}

/// Tuning for the send-first strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendFirstSchedule {
    pub max_resubmits: u32,
    pub wake_attempts: u32,
    pub wake_spacing_units: u64,
    pub base_wait_units: u64,
    pub step_wait_units: u64,
}

impl Default for SendFirstSchedule {
    fn default() -> Self {
        Self {
            max_resubmits: MAX_RESUBMITS,
            wake_attempts: WAKE_BURST_ATTEMPTS,
            wake_spacing_units: WAKE_BURST_SPACING_UNITS,
            base_wait_units: RESUBMIT_BASE_UNITS,
            step_wait_units: RESUBMIT_STEP_UNITS,
        }
    }
}

impl SendFirstSchedule {
    /// `base + step * retry` for `retry` in `1..=max_resubmits`.
    pub fn resubmit_wait_units(&self, retry: u32) -> u64 {
        self.base_wait_units + self.step_wait_units * u64::from(retry)
    }
}
