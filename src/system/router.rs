//! Command routing
//!
//! The host link tasks hand every received command byte to a [`CommandRouter`]. Drive commands
//! go to the motors through a [`MotorPort`], report selections change what the next status
//! read returns.

use embassy_time::Instant;

use crate::system::actuator::Actuator;
use crate::system::command::{Command, Encoding, Report};
use crate::system::controller::SharedController;
use crate::system::limit_switch::LimitSense;
use crate::system::motor::{Direction, MotorId, StartOutcome};
use crate::system::status::Snapshot;

/// Access to the motors from a host link
pub trait MotorPort {
    /// Request a start of `motor` toward `direction`
    fn drive(&self, motor: MotorId, direction: Direction, now: Instant);

    /// Current state of both motors
    fn snapshot(&self) -> Snapshot;
}

impl<A: Actuator, S: LimitSense> MotorPort for SharedController<A, S> {
    fn drive(&self, motor: MotorId, direction: Direction, now: Instant) {
        match self.lock(|c| c.start(motor, direction, now)) {
            Some(StartOutcome::Started) => {}
            Some(outcome) => crate::log_debug!("{:?} {:?}: {:?}", motor, direction, outcome),
            None => crate::log_warn!("Drive request before controller init"),
        }
    }

    fn snapshot(&self) -> Snapshot {
        self.lock(|c| c.snapshot()).unwrap_or_default()
    }
}

/// Decodes host bytes and keeps the report selection
pub struct CommandRouter {
    encoding: Encoding,
    report: Report,
}

impl CommandRouter {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            report: Report::default(),
        }
    }

    /// Decode and act on one command byte
    pub fn handle<P: MotorPort + ?Sized>(
        &mut self,
        byte: u8,
        port: &P,
        now: Instant,
    ) -> Option<Command> {
        let command = self.encoding.decode(byte);
        match command {
            Some(Command::Drive { motor, direction }) => port.drive(motor, direction, now),
            Some(Command::Select(report)) => self.report = report,
            None => crate::log_debug!("Ignoring command byte {}", byte),
        }
        command
    }

    pub fn report(&self) -> Report {
        self.report
    }

    /// Byte returned to a status read
    pub fn response<P: MotorPort + ?Sized>(&self, port: &P, sensor_bits: u8) -> u8 {
        match self.report {
            Report::MotorStatus => port.snapshot().status_word(),
            Report::Sensors => sensor_bits,
        }
    }
}
