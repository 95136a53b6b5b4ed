use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Cancellation flag shared between the caller and an in-flight delivery.
pub type CancelSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

pub fn is_cancelled(cancel: Option<&CancelSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

/// Blocking wait used between attempts.
///
/// Implementations may return early once `cancel` is set; the coordinator
/// checks the signal again after every wait.
pub trait Sleeper {
    fn sleep(&self, duration: Duration, cancel: Option<&CancelSignal>);
}

impl<T: Sleeper + ?Sized> Sleeper for &T {
    fn sleep(&self, duration: Duration, cancel: Option<&CancelSignal>) {
        (**self).sleep(duration, cancel);
    }
}

/// Real-time sleeper that wakes in short slices to observe cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, cancel: Option<&CancelSignal>) {
        if cancel.is_none() {
            thread::sleep(duration);
            return;
        }

        let deadline = Instant::now() + duration;
        loop {
            if is_cancelled(cancel) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_sleep_returns_early() {
        let cancel: CancelSignal = Arc::new(AtomicBool::new(true));
        let started = Instant::now();
        ThreadSleeper.sleep(Duration::from_secs(5), Some(&cancel));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn uncancelled_sleep_waits_full_duration() {
        let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
        let started = Instant::now();
        ThreadSleeper.sleep(Duration::from_millis(60), Some(&cancel));
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
