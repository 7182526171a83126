//! Host command decoding
//!
//! Every host command is one byte. Three layouts are in use:
//!
//! | Encoding | Bits                                                        |
//! |----------|-------------------------------------------------------------|
//! | Minimal  | bit1 motor, bit0 direction                                  |
//! | Extended | bit2 = 1: bit1 motor, bit0 direction                        |
//! |          | bit2 = 0: bit0 selects the report (0 motors, 1 sensors)     |
//! | Tagged   | bits 5..2 must be `1001`, then bit1 motor, bit0 direction   |
//!
//! Direction 0 is up, 1 is down. Motor 0 is motor 1.

use crate::system::motor::{Direction, MotorId};

/// Tag carried in bits 5..2 of every serial command
pub const SERIAL_TAG: u8 = 0b1001;

/// What a status read returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum Report {
    /// 4-bit motor/error word
    #[default]
    MotorStatus,
    /// One bit per photodiode
    Sensors,
}

/// Decoded host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum Command {
    /// Start a motor toward a direction
    Drive { motor: MotorId, direction: Direction },
    /// Change what later status reads return
    Select(Report),
}

/// Command byte layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum Encoding {
    Minimal,
    Extended,
    Tagged,
}

impl Encoding {
    /// Decode one command byte, `None` if it carries no valid command
    pub fn decode(self, byte: u8) -> Option<Command> {
        match self {
            Encoding::Minimal => Some(drive(byte)),
            Encoding::Extended => {
                if byte & 0b100 != 0 {
                    Some(drive(byte))
                } else if byte & 1 == 0 {
                    Some(Command::Select(Report::MotorStatus))
                } else {
                    Some(Command::Select(Report::Sensors))
                }
            }
            Encoding::Tagged => ((byte >> 2) & 0x0F == SERIAL_TAG).then(|| drive(byte)),
        }
    }
}

fn drive(byte: u8) -> Command {
    Command::Drive {
        motor: MotorId::from_bit(byte >> 1),
        direction: Direction::from_bit(byte),
    }
}
