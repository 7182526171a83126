//! Status packing
//!
//! Host-facing bit layouts:
//! - Motor word (4 bits): motor 1 moving, motor 1 error, motor 2 moving, motor 2 error,
//!   from bit 3 down to bit 0
//! - Sensor bits: one per photodiode, first sensor in the most significant used bit
//! - Limit bits (4 bits): motor 1 top, motor 1 lower, motor 2 top, motor 2 lower,
//!   from bit 3 down to bit 0
//! - Serial status line: limits in bits 14..11, motor word in bits 10..7, sensor bits in 6..0

use core::fmt::Write;

use heapless::String;

use crate::system::motor::MotorStatus;

/// Pack two motors into the 4-bit status word
pub fn pack_motor_status(m1: MotorStatus, m2: MotorStatus) -> u8 {
    (u8::from(m1.moving) << 3)
        | (u8::from(m1.error) << 2)
        | (u8::from(m2.moving) << 1)
        | u8::from(m2.error)
}

/// Pack sensor states, first item ending up in the most significant position
pub fn pack_sensor_bits(active: impl IntoIterator<Item = bool>) -> u8 {
    active.into_iter().fold(0, |bits, on| (bits << 1) | u8::from(on))
}

/// Which side of the threshold counts as active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum SensorPolarity {
    /// Active when the sample is above the threshold
    ActiveAbove,
    /// Active when the sample is below the threshold
    ActiveBelow,
}

impl SensorPolarity {
    pub fn is_active(self, sample: u16, threshold: u16) -> bool {
        match self {
            SensorPolarity::ActiveAbove => sample > threshold,
            SensorPolarity::ActiveBelow => sample < threshold,
        }
    }
}

/// Both limit sensors of one motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub struct LimitReadings {
    pub top: bool,
    pub lower: bool,
}

/// Pack both motors' limit readings into 4 bits
pub fn pack_limit_bits(m1: LimitReadings, m2: LimitReadings) -> u8 {
    pack_sensor_bits([m1.top, m1.lower, m2.top, m2.lower])
}

/// State of both motors sampled at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub struct Snapshot {
    pub motors: [MotorStatus; 2],
    /// Packed limit bits, see [`pack_limit_bits`]
    pub limits: u8,
}

impl Snapshot {
    /// 4-bit motor/error word
    pub fn status_word(&self) -> u8 {
        pack_motor_status(self.motors[0], self.motors[1])
    }
}

/// Combined status pushed periodically over serial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    pub limits: u8,
    pub motors: u8,
    pub sensors: u8,
}

impl StatusLine {
    pub fn new(snapshot: &Snapshot, sensors: u8) -> Self {
        Self {
            limits: snapshot.limits,
            motors: snapshot.status_word(),
            sensors,
        }
    }

    pub fn encode(&self) -> u32 {
        (u32::from(self.limits & 0x0F) << 11)
            | (u32::from(self.motors & 0x0F) << 7)
            | u32::from(self.sensors & 0x7F)
    }

    /// Decimal text terminated by a newline
    pub fn render(&self) -> String<12> {
        let mut line = String::new();
        // At most 5 digits plus the newline, always fits
        let _ = writeln!(line, "{}", self.encode());
        line
    }
}
