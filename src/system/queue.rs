//! Host link to control loop hand-off
//!
//! With polled scheduling a single control loop owns the controller. Host links never touch
//! it directly: drive requests go through [`DriveQueue`] and the loop publishes its latest
//! [`Snapshot`] into a [`SnapshotCell`] after every iteration.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;

use crate::system::actuator::Actuator;
use crate::system::controller::Controller;
use crate::system::limit_switch::LimitSense;
use crate::system::motor::{Direction, MotorId, MotorStatus};
use crate::system::router::MotorPort;
use crate::system::status::Snapshot;

/// Pending start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub struct DriveRequest {
    pub motor: MotorId,
    pub direction: Direction,
    /// When the host sent the command
    pub at: Instant,
}

/// Drive requests waiting for the control loop
pub type DriveQueue = Channel<CriticalSectionRawMutex, DriveRequest, 8>;

/// Last snapshot published by the control loop
pub struct SnapshotCell {
    inner: Mutex<CriticalSectionRawMutex, Cell<Snapshot>>,
}

impl SnapshotCell {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(Snapshot {
                motors: [MotorStatus::IDLE; 2],
                limits: 0,
            })),
        }
    }

    pub fn publish(&self, snapshot: Snapshot) {
        self.inner.lock(|cell| cell.set(snapshot));
    }

    pub fn load(&self) -> Snapshot {
        self.inner.lock(|cell| cell.get())
    }
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new()
    }
}

/// [`MotorPort`] for polled scheduling
pub struct QueuedPort<'a> {
    queue: &'a DriveQueue,
    snapshot: &'a SnapshotCell,
}

impl<'a> QueuedPort<'a> {
    pub const fn new(queue: &'a DriveQueue, snapshot: &'a SnapshotCell) -> Self {
        Self { queue, snapshot }
    }
}

impl MotorPort for QueuedPort<'_> {
    fn drive(&self, motor: MotorId, direction: Direction, now: Instant) {
        let request = DriveRequest {
            motor,
            direction,
            at: now,
        };
        if self.queue.try_send(request).is_err() {
            crate::log_warn!("Drive queue full, dropping {:?} {:?}", motor, direction);
        }
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshot.load()
    }
}

/// Apply every queued request to the controller, returns how many were applied
pub fn drain<A: Actuator, S: LimitSense>(
    queue: &DriveQueue,
    controller: &mut Controller<A, S>,
) -> usize {
    let mut applied = 0;
    while let Ok(request) = queue.try_receive() {
        controller.start(request.motor, request.direction, request.at);
        applied += 1;
    }
    applied
}
