//! Hardware error type
//!
//! Adapters around HAL peripherals map their specific errors into [`Error`]. None of these
//! ever leave the motor state machine as an `Err`: they end up as a start outcome or a log line.

use thiserror::Error;

/// Result type for hardware adapter operations
pub type Result<T> = core::result::Result<T, Error>;

/// Failures reported by the hardware adapters
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum Error {
    /// A direction output could not be driven
    #[error("digital output could not be driven")]
    Pin,
    /// The enable PWM channel rejected a duty cycle
    #[error("PWM duty cycle could not be set")]
    Pwm,
    /// Host bus transfer failed
    #[error("bus transfer failed")]
    Bus,
    /// Photodiode conversion failed
    #[error("ADC conversion failed")]
    Adc,
    /// Serial transfer failed
    #[error("serial transfer failed")]
    Uart,
}
