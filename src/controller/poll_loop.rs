//! Fixed-cadence poll loop over one seesaw gamepad.
//!
//! The loop is a two-state machine:
//!
//! ```text
//! Uninitialized ──initialize()──► Polling ──run(token)──► (cancelled)
//!                 (software reset)        tick, sleep, tick, ...
//! ```
//!
//! Each tick reads both stick axes and, when enabled, the bulk GPIO state,
//! then hands a [`TickReport`] to the configured [`TickObserver`]. The loop
//! consumes itself on `run`, so the transport is released however it ends.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use statum::{machine, state};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::clock::Clock;
use super::direction::{classify, Direction, Orientation};
use super::seesaw::{SeesawDriver, SeesawError, JOYSTICK_X_CHANNEL, JOYSTICK_Y_CHANNEL};
use super::signal::{condition_buttons, Buttons, Coordinate};

#[derive(Clone, Debug)]
pub struct PollSettings {
    /// Idle time between the end of one tick and the start of the next
    pub poll_interval: Duration,
    /// Whether to issue the bulk GPIO read each tick
    pub read_buttons: bool,
    pub orientation: Orientation,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            read_buttons: true,
            orientation: Orientation::Screen,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Device error: {0}")]
    Driver(#[from] SeesawError),
}

/// Everything sampled and derived during one tick
#[derive(Clone, Debug)]
pub struct TickReport {
    pub tick: u64,
    pub timestamp: DateTime<Local>,
    pub raw_x: u16,
    pub raw_y: u16,
    pub coordinate: Coordinate,
    pub direction: Direction,
    /// `None` when button polling is disabled
    pub buttons: Option<Buttons>,
}

impl std::fmt::Display for TickReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.direction {
            Direction::Centered => write!(f, "Joystick is centered")?,
            direction => write!(f, "Joystick moving {}", direction)?,
        }
        write!(f, " | {}", self.coordinate)?;
        if let Some(buttons) = self.buttons {
            write!(f, " | buttons: {}", buttons)?;
        }
        Ok(())
    }
}

/// Receives every tick report; rendering and telemetry live behind this.
pub trait TickObserver: Send {
    fn on_tick(&mut self, report: &TickReport);
}

/// Logs each tick through `tracing`. Changes are logged at info level, the
/// raw samples of every tick at debug level.
#[derive(Debug, Default)]
pub struct TracingObserver {
    last_direction: Option<Direction>,
    last_buttons: Option<Buttons>,
}

impl TracingObserver {
    /// Remembers the direction and buttons of `report`; true if either changed
    fn record(&mut self, report: &TickReport) -> bool {
        let changed = self.last_direction != Some(report.direction)
            || self.last_buttons != report.buttons;
        if changed {
            self.last_direction = Some(report.direction);
            self.last_buttons = report.buttons;
        }
        changed
    }
}

impl TickObserver for TracingObserver {
    fn on_tick(&mut self, report: &TickReport) {
        debug!(
            "Tick {} at {}: raw ({}, {}) -> {}",
            report.tick,
            report.timestamp.format("%H:%M:%S.%3f"),
            report.raw_x,
            report.raw_y,
            report.coordinate
        );

        if self.record(report) {
            info!("{}", report);
        }
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum PollState {
    Uninitialized,
    Polling,
}

#[machine]
pub struct Poller<S: PollState> {
    driver: SeesawDriver,
    settings: PollSettings,
    clock: Arc<dyn Clock>,
    observer: Box<dyn TickObserver>,
    ticks: u64,
}

impl Poller<Uninitialized> {
    pub fn create(
        driver: SeesawDriver,
        settings: PollSettings,
        clock: Arc<dyn Clock>,
        observer: Box<dyn TickObserver>,
    ) -> Self {
        debug!("Creating poller with settings: {:?}", settings);
        Self::new(driver, settings, clock, observer, 0)
    }

    /// Resets the device once and transitions to Polling
    pub fn initialize(mut self) -> Result<Poller<Polling>, PollError> {
        info!("Resetting seesaw device");
        self.driver.reset()?;
        info!("Seesaw ready, transitioning to Polling state");
        Ok(self.transition())
    }
}

impl Poller<Polling> {
    /// Samples the device once and reports the result
    pub fn tick(&mut self) -> Result<TickReport, PollError> {
        let raw_x = self.driver.read_analog(JOYSTICK_X_CHANNEL)?;
        let raw_y = self.driver.read_analog(JOYSTICK_Y_CHANNEL)?;
        let buttons = if self.settings.read_buttons {
            Some(condition_buttons(self.driver.read_digital_bulk()?))
        } else {
            None
        };

        let coordinate = Coordinate::from_raw(raw_x, raw_y);
        let report = TickReport {
            tick: self.ticks,
            timestamp: Local::now(),
            raw_x,
            raw_y,
            coordinate,
            direction: classify(coordinate, self.settings.orientation),
            buttons,
        };
        self.ticks += 1;

        self.observer.on_tick(&report);
        Ok(report)
    }

    /// Polls until `token` is cancelled and returns the number of ticks.
    ///
    /// The token is checked once per iteration, before sampling. Any device
    /// error ends the loop.
    pub fn run(mut self, token: &CancellationToken) -> Result<u64, PollError> {
        info!(
            "Starting poll loop every {:?} (buttons: {})",
            self.settings.poll_interval, self.settings.read_buttons
        );

        while !token.is_cancelled() {
            self.tick()?;
            self.clock.sleep(self.settings.poll_interval);
        }

        info!("Poll loop cancelled after {} ticks", self.ticks);
        Ok(self.ticks)
    }
}
