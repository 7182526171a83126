//! Deployment configuration
//!
//! Compile-time settings for one board. Pin assignment lives with the firmware tasks in
//! `task::resources`.

use embassy_time::Duration;

use crate::system::limit_switch::ReadPolicy;
use crate::system::motor::{ErrorOnStart, MotorConfig};
use crate::system::status::SensorPolarity;

/// Host link the firmware listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum Transport {
    /// I2C slave, one command byte per write, one status byte per read
    I2c,
    /// UART with newline-terminated decimal commands and a periodic status line
    Serial,
}

/// How the safety checks are driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum Scheduling {
    /// Limit edges and a periodic tick each run the checks under a critical section
    Interrupt,
    /// One control loop owns both motors and checks them every iteration
    Polling,
}

/// Maximum run time before a motor is stopped and flagged
pub const MOTOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Whether a successful start clears a stale timeout flag
pub const ERROR_ON_START: ErrorOnStart = ErrorOnStart::Retain;

/// Per-motor configuration, identical for both actuators
pub const MOTOR: MotorConfig = MotorConfig {
    timeout: MOTOR_TIMEOUT,
    error_on_start: ERROR_ON_START,
};

/// Limit switch sampling
pub const LIMIT_READ_POLICY: ReadPolicy = ReadPolicy::Debounced { samples: 10 };

/// Enable internal pull-ups on the limit inputs. Off for boards with external pull-ups.
pub const LIMIT_PULL_UP: bool = false;

/// Period of the safety check in the interrupt-driven model
pub const SAFETY_TICK: Duration = Duration::from_millis(10);

/// Pause between control loop iterations in the polling model
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

pub const TRANSPORT: Transport = Transport::I2c;
pub const SCHEDULING: Scheduling = Scheduling::Interrupt;

/// 7-bit slave address on the host I2C bus
pub const I2C_ADDRESS: u8 = 0x02;

pub const SERIAL_BAUD: u32 = 115_200;

/// Number of photodiodes wired to ADC inputs
pub const PHOTODIODE_COUNT: usize = 3;

/// Raw 12-bit ADC level separating dark from lit
pub const PHOTODIODE_THRESHOLD: u16 = 200;

pub const PHOTODIODE_POLARITY: SensorPolarity = SensorPolarity::ActiveAbove;

/// Photodiode sampling period
pub const PHOTODIODE_INTERVAL: Duration = Duration::from_millis(50);

/// Period of the serial status line
pub const STATUS_PUSH_INTERVAL: Duration = Duration::from_millis(200);

/// Period of the diagnostic dump over defmt
pub const DEBUG_REPORT_INTERVAL: Duration = Duration::from_secs(5);
