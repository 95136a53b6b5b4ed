//! Interactive session: menu loop and one-shot actions over a coordinator.

use std::io::{self, BufRead, Write};
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::warn;
use vehicle_api::{VehicleCommandChannel, Vin, WakeState};
use wake_retry::{DeliveryProgress, Sleeper, WakeRetryCoordinator};

use crate::menu::{menu_text, MenuChoice, VehicleAction};
use crate::render::{delivery_line, progress_line, wake_line};

pub struct Session<C, S, W> {
    coordinator: WakeRetryCoordinator<C, S>,
    vin: Vin,
    out: W,
}

impl<C, S, W> Session<C, S, W>
where
    C: VehicleCommandChannel,
    S: Sleeper,
    W: Write,
{
    pub fn new(coordinator: WakeRetryCoordinator<C, S>, vin: Vin, out: W) -> Self {
        Self {
            coordinator,
            vin,
            out,
        }
    }

    pub fn coordinator(&self) -> &WakeRetryCoordinator<C, S> {
        &self.coordinator
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Deliver one action, printing progress. Returns whether it was delivered.
    pub fn run_action(&mut self, action: VehicleAction) -> io::Result<bool> {
        self.reset_cancel();
        writeln!(self.out, "{}", action.in_progress_message())?;

        let command = action.command();
        let time_unit = self.coordinator.config().time_unit;
        let Self {
            coordinator,
            vin,
            out,
        } = self;
        let mut write_result = Ok(());
        let outcome = coordinator.deliver_with_handler(vin, &command, |progress| {
            write_progress(out, &progress, time_unit, &mut write_result);
        });
        write_result?;

        writeln!(
            self.out,
            "{}",
            delivery_line(&outcome, action.success_message())
        )?;
        Ok(outcome.is_delivered())
    }

    /// Run a wake cycle without sending a command.
    pub fn wake(&mut self) -> io::Result<bool> {
        self.reset_cancel();
        let time_unit = self.coordinator.config().time_unit;
        let Self {
            coordinator,
            vin,
            out,
        } = self;
        let mut write_result = Ok(());
        let outcome = coordinator.ensure_awake_with_handler(vin, |progress| {
            write_progress(out, &progress, time_unit, &mut write_result);
        });
        write_result?;

        if !outcome.is_awake() {
            warn!(vin = %self.vin, outcome = %outcome, "wake cycle did not complete");
        }
        writeln!(self.out, "{}", wake_line(&outcome))?;
        Ok(outcome.is_awake())
    }

    /// Probe once and print the reported state.
    pub fn status(&mut self) -> io::Result<Option<WakeState>> {
        match self.coordinator.channel().probe_wake_state(&self.vin) {
            Ok(state) => {
                writeln!(self.out, "Vehicle {} is {}", self.vin, state.label())?;
                Ok(Some(state))
            }
            Err(error) => {
                writeln!(self.out, "Error: Could not check vehicle state: {error}")?;
                Ok(None)
            }
        }
    }

    /// Wake on startup. Failure is reported and otherwise ignored.
    pub fn initial_wake(&mut self) -> io::Result<()> {
        writeln!(self.out, "Initial vehicle status check:")?;
        self.wake()?;
        writeln!(self.out)
    }

    /// Read choices from `input` until Quit or end of input.
    pub fn run_menu<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        let mut line = String::new();
        loop {
            write!(self.out, "{}", menu_text())?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                writeln!(self.out, "Goodbye!")?;
                return Ok(());
            }
            writeln!(self.out)?;

            match line.parse::<MenuChoice>() {
                Ok(MenuChoice::Action(action)) => {
                    self.run_action(action)?;
                }
                Ok(MenuChoice::Wake) => {
                    self.wake()?;
                }
                Ok(MenuChoice::Quit) => {
                    writeln!(self.out, "Goodbye!")?;
                    return Ok(());
                }
                Err(error) => writeln!(self.out, "{error}")?,
            }
            writeln!(self.out)?;
        }
    }

    fn reset_cancel(&self) {
        if let Some(cancel) = self.coordinator.cancel_signal() {
            cancel.store(false, Ordering::Release);
        }
    }
}

fn write_progress<W: Write>(
    out: &mut W,
    progress: &DeliveryProgress,
    time_unit: Duration,
    result: &mut io::Result<()>,
) {
    if result.is_err() {
        return;
    }
    if let Some(line) = progress_line(progress, time_unit) {
        *result = writeln!(out, "{line}");
    }
}
