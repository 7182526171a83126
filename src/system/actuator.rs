//! Actuator drive stage
//!
//! Each linear actuator sits behind an H-bridge with one enable input and two direction inputs:
//! - Up: IN1 high, IN2 low
//! - Down: IN1 low, IN2 high
//! - Released: both low (coast)
//!
//! The enable input is a PWM channel held at full duty. Speed control is not used, so the
//! channel only ever sees 100 %.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::system::error::{Error, Result};
use crate::system::motor::Direction;

/// Output stage of one motor
pub trait Actuator {
    /// Drive toward `direction` at full strength
    fn drive(&mut self, direction: Direction) -> Result<()>;

    /// Deassert both direction inputs
    fn release(&mut self) -> Result<()>;
}

/// H-bridge channel with PWM enable and two direction pins
pub struct HBridge<EN, IN1, IN2> {
    enable: EN,
    in1: IN1,
    in2: IN2,
}

impl<EN, IN1, IN2> HBridge<EN, IN1, IN2>
where
    EN: SetDutyCycle,
    IN1: OutputPin,
    IN2: OutputPin,
{
    pub fn new(enable: EN, in1: IN1, in2: IN2) -> Self {
        Self { enable, in1, in2 }
    }

    fn set_direction_pins(&mut self, in1: bool, in2: bool) -> Result<()> {
        // Lower the pin that goes low first so both are never high together
        if in1 {
            self.in2.set_state(in2.into()).map_err(|_| Error::Pin)?;
            self.in1.set_state(in1.into()).map_err(|_| Error::Pin)
        } else {
            self.in1.set_state(in1.into()).map_err(|_| Error::Pin)?;
            self.in2.set_state(in2.into()).map_err(|_| Error::Pin)
        }
    }

    fn full_strength(&mut self) -> Result<()> {
        self.enable.set_duty_cycle_fully_on().map_err(|_| Error::Pwm)
    }
}

impl<EN, IN1, IN2> Actuator for HBridge<EN, IN1, IN2>
where
    EN: SetDutyCycle,
    IN1: OutputPin,
    IN2: OutputPin,
{
    fn drive(&mut self, direction: Direction) -> Result<()> {
        self.full_strength()?;
        match direction {
            Direction::Up => self.set_direction_pins(true, false),
            Direction::Down => self.set_direction_pins(false, true),
        }
    }

    fn release(&mut self) -> Result<()> {
        self.set_direction_pins(false, false)?;
        // Enable goes back to its idle level, which is also full duty
        self.full_strength()
    }
}
