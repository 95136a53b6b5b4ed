//! Ctrl-C handling.
//!
//! The first SIGINT/SIGTERM sets the cancel flag so an in-flight wake or
//! retry loop stops at its next wait. A signal that arrives while the flag
//! is still set exits the process.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wake_retry::CancelSignal;

pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Keeps the signal thread alive; dropping it unregisters the handler.
pub struct InterruptGuard {
    #[cfg(unix)]
    handle: signal_hook::iterator::Handle,
    #[cfg(unix)]
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::debug!("interrupt thread panicked");
            }
        }
    }
}

/// What a signal should do given the current flag value.
pub fn on_signal(cancel: &AtomicBool) -> bool {
    let already_cancelled = cancel.swap(true, Ordering::AcqRel);
    !already_cancelled
}

#[cfg(unix)]
pub fn install(cancel: CancelSignal) -> io::Result<InterruptGuard> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();
    let thread = std::thread::spawn(move || {
        for signal in signals.forever() {
            if on_signal(&cancel) {
                tracing::info!(signal, "interrupt received; cancelling current operation");
            } else {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    });

    Ok(InterruptGuard {
        handle,
        thread: Some(thread),
    })
}

#[cfg(not(unix))]
pub fn install(_cancel: CancelSignal) -> io::Result<InterruptGuard> {
    Ok(InterruptGuard {})
}

pub fn new_cancel_signal() -> CancelSignal {
    Arc::new(AtomicBool::new(false))
}
