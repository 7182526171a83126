//! Both motors as one unit
//!
//! [`Controller`] owns the two [`MotorUnit`]s and runs operations on them by [`MotorId`].
//!
//! With interrupt-driven scheduling the controller is shared between the limit watchers, the
//! safety tick and the host link. [`SharedController`] keeps it behind a critical-section mutex
//! so every multi-field update, and every status snapshot, happens in one critical section.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;

use crate::system::actuator::Actuator;
use crate::system::limit_switch::LimitSense;
use crate::system::motor::{Direction, MotorId, MotorUnit, StartOutcome, StopCause};
use crate::system::status::{pack_limit_bits, Snapshot};

/// Motor 1 and motor 2
pub struct Controller<A, S> {
    motors: [MotorUnit<A, S>; 2],
}

impl<A: Actuator, S: LimitSense> Controller<A, S> {
    pub fn new(motor1: MotorUnit<A, S>, motor2: MotorUnit<A, S>) -> Self {
        Self {
            motors: [motor1, motor2],
        }
    }

    pub fn motor(&self, id: MotorId) -> &MotorUnit<A, S> {
        &self.motors[id.index()]
    }

    pub fn motor_mut(&mut self, id: MotorId) -> &mut MotorUnit<A, S> {
        &mut self.motors[id.index()]
    }

    pub fn start(&mut self, id: MotorId, direction: Direction, now: Instant) -> StartOutcome {
        self.motor_mut(id).start(direction, now)
    }

    /// Explicit stop of one motor
    pub fn stop(&mut self, id: MotorId) {
        self.motor_mut(id).stop_for(StopCause::Command);
    }

    /// Limit check for one motor, used when its switch changed
    pub fn check_limits(&mut self, id: MotorId) -> Option<StopCause> {
        self.motor_mut(id).check_limits()
    }

    /// Full safety sweep over both motors
    pub fn check_state(&mut self, now: Instant) -> [Option<StopCause>; 2] {
        let [m1, m2] = &mut self.motors;
        [m1.check_state(now), m2.check_state(now)]
    }

    /// Status of both motors and all four limits
    pub fn snapshot(&mut self) -> Snapshot {
        let [m1, m2] = &mut self.motors;
        Snapshot {
            motors: [m1.status(), m2.status()],
            limits: pack_limit_bits(m1.limit_readings(), m2.limit_readings()),
        }
    }
}

/// Controller shared between tasks under a critical section
pub struct SharedController<A, S> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<Controller<A, S>>>>,
}

impl<A, S> SharedController<A, S> {
    /// Empty slot, filled once at boot with [`SharedController::init`]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    pub fn init(&self, controller: Controller<A, S>) {
        self.inner.lock(|cell| {
            cell.replace(Some(controller));
        });
    }

    /// Run `f` on the controller inside a critical section
    ///
    /// Returns `None` if the controller has not been initialised yet.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Controller<A, S>) -> R) -> Option<R> {
        self.inner.lock(|cell| cell.borrow_mut().as_mut().map(f))
    }
}

impl<A, S> Default for SharedController<A, S> {
    fn default() -> Self {
        Self::new()
    }
}
