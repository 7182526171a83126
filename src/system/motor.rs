//! Motor safety state machine
//!
//! One [`MotorUnit`] per actuator. It owns the drive stage and both limit sensors and tracks:
//! - whether the motor is moving and in which direction
//! - when the current run started
//! - a latched error flag recording that the last automatic stop was a timeout
//!
//! # States
//! - Idle: not moving, no error
//! - Running: moving up or down
//! - Idle with error: not moving, last automatic stop was the timeout guard
//!
//! # Stops
//! Every stop goes through [`MotorUnit::stop_for`] with a [`StopCause`]:
//! - `Command`: host asked for it, error flag untouched
//! - `Limit`: end of travel reached, error flag cleared
//! - `Timeout`: ran longer than the configured timeout, error flag set
//!
//! The unit never reads a clock. Callers pass `now` so the same logic runs from a periodic
//! tick, a polled loop or a host test.

use embassy_time::{Duration, Instant};

use crate::system::actuator::Actuator;
use crate::system::limit_switch::LimitSense;
use crate::system::status::LimitReadings;

/// Travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum Direction {
    /// Toward the top limit
    Up = 0,
    /// Toward the lower limit
    Down = 1,
}

impl Direction {
    /// Direction from a command bit (0 = up, 1 = down)
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// Motor index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum MotorId {
    Motor1,
    Motor2,
}

impl MotorId {
    pub const ALL: [MotorId; 2] = [MotorId::Motor1, MotorId::Motor2];

    /// Motor from a command bit (0 = motor 1, 1 = motor 2)
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            MotorId::Motor1
        } else {
            MotorId::Motor2
        }
    }

    pub fn index(self) -> usize {
        match self {
            MotorId::Motor1 => 0,
            MotorId::Motor2 => 1,
        }
    }
}

/// Why a motor stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum StopCause {
    /// Explicit stop request
    Command,
    /// Limit switch for the current direction reported pressed
    Limit,
    /// Run time exceeded the configured timeout
    Timeout,
}

/// What a successful start does to a latched error flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum ErrorOnStart {
    /// Keep the flag until the next limit stop
    Retain,
    /// Clear the flag as soon as a new run starts
    Clear,
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum StartOutcome {
    /// Motor is running in the requested direction
    Started,
    /// Limit for the requested direction is already pressed, nothing changed
    Rejected,
    /// Drive stage failed, motor released and left idle
    DriveFault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorConfig {
    /// Maximum run time before the timeout guard stops the motor
    pub timeout: Duration,
    pub error_on_start: ErrorOnStart,
}

/// Copy of the bits reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub struct MotorStatus {
    pub moving: bool,
    pub error: bool,
    pub direction: Direction,
}

impl MotorStatus {
    pub const IDLE: MotorStatus = MotorStatus {
        moving: false,
        error: false,
        direction: Direction::Up,
    };
}

impl Default for MotorStatus {
    fn default() -> Self {
        Self::IDLE
    }
}

/// State machine for one actuator
pub struct MotorUnit<A, S> {
    id: MotorId,
    actuator: A,
    top: S,
    lower: S,
    config: MotorConfig,
    moving: bool,
    direction: Direction,
    start_time: Instant,
    error: bool,
}

impl<A: Actuator, S: LimitSense> MotorUnit<A, S> {
    /// Create an idle unit and release its drive stage
    pub fn new(id: MotorId, actuator: A, top: S, lower: S, config: MotorConfig) -> Self {
        let mut unit = Self {
            id,
            actuator,
            top,
            lower,
            config,
            moving: false,
            direction: Direction::Up,
            start_time: Instant::from_ticks(0),
            error: false,
        };
        unit.release();
        unit
    }

    /// Start moving toward `direction`
    ///
    /// Rejected without any side effect if the limit for that direction already reads pressed.
    /// A start while running restarts the timeout window.
    pub fn start(&mut self, direction: Direction, now: Instant) -> StartOutcome {
        if self.limit_pressed(direction) {
            crate::log_debug!("{:?}: start {:?} rejected, limit pressed", self.id, direction);
            return StartOutcome::Rejected;
        }

        if let Err(e) = self.actuator.drive(direction) {
            crate::log_error!("{:?}: drive {:?} failed: {:?}", self.id, direction, e);
            self.release();
            self.moving = false;
            return StartOutcome::DriveFault;
        }

        self.moving = true;
        self.direction = direction;
        self.start_time = now;
        if self.config.error_on_start == ErrorOnStart::Clear {
            self.error = false;
        }
        crate::log_info!("{:?}: moving {:?}", self.id, direction);
        StartOutcome::Started
    }

    /// Stop without touching the error flag
    pub fn stop(&mut self) {
        self.release();
        self.moving = false;
    }

    /// Stop and update the error flag for `cause`
    pub fn stop_for(&mut self, cause: StopCause) {
        self.stop();
        match cause {
            StopCause::Command => {}
            StopCause::Limit => self.clear_error_state(),
            StopCause::Timeout => self.set_error_state(),
        }
        crate::log_info!("{:?}: stopped ({:?})", self.id, cause);
    }

    /// Stop if the limit for the current direction is pressed
    pub fn check_limits(&mut self) -> Option<StopCause> {
        if self.moving && self.limit_pressed(self.direction) {
            self.stop_for(StopCause::Limit);
            return Some(StopCause::Limit);
        }
        None
    }

    /// Stop and flag the motor if it has run longer than the timeout
    pub fn check_timeout(&mut self, now: Instant) -> Option<StopCause> {
        if self.moving && self.running_time(now) > self.config.timeout {
            crate::log_warn!(
                "{:?}: no limit after {} ms",
                self.id,
                self.running_time(now).as_millis()
            );
            self.stop_for(StopCause::Timeout);
            return Some(StopCause::Timeout);
        }
        None
    }

    /// Periodic safety check: limit first, then timeout
    ///
    /// A motor stopped by its limit is idle by the time the timeout is checked, so one sweep
    /// never reports both.
    pub fn check_state(&mut self, now: Instant) -> Option<StopCause> {
        self.check_limits().or_else(|| self.check_timeout(now))
    }

    /// Time since the current run started
    pub fn running_time(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Last commanded direction, kept after a stop
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_in_error_state(&self) -> bool {
        self.error
    }

    pub fn set_error_state(&mut self) {
        self.error = true;
    }

    pub fn clear_error_state(&mut self) {
        self.error = false;
    }

    pub fn status(&self) -> MotorStatus {
        MotorStatus {
            moving: self.moving,
            error: self.error,
            direction: self.direction,
        }
    }

    /// Current reading of both limit sensors
    pub fn limit_readings(&mut self) -> LimitReadings {
        LimitReadings {
            top: self.top.is_pressed(),
            lower: self.lower.is_pressed(),
        }
    }

    fn limit_pressed(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.top.is_pressed(),
            Direction::Down => self.lower.is_pressed(),
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.actuator.release() {
            crate::log_error!("{:?}: release failed: {:?}", self.id, e);
        }
    }
}
