//! Limit switch sampling
//!
//! End-of-travel switches are wired active low: a pressed switch pulls the input to ground.
//!
//! Two read policies are in use across boards:
//! - [`ReadPolicy::Direct`]: a single sample decides
//! - [`ReadPolicy::Debounced`]: every one of a fixed number of samples must read pressed, and
//!   the first sample that reads released ends the evaluation as "not pressed"
//!
//! The debounced policy filters the noise the motors induce on the switch lines when they
//! start, while a release is still seen on the very first sample.
//!
//! The motor state machine reads limits through [`LimitSense`]. With polled scheduling the
//! [`LimitSwitch`] itself is handed to the motor. With interrupt-driven scheduling a
//! watcher task owns the switch and publishes its level into a [`LimitLatch`].
//!
//! The watcher waits for the input *level* to differ from what it last published, not for an
//! edge. A switch that settles while a read is in progress is therefore picked up on the next
//! wait instead of being lost with the edge.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

/// How a limit switch input is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2350", derive(defmt::Format))]
pub enum ReadPolicy {
    /// One sample per evaluation
    Direct,
    /// Up to `samples` reads per evaluation, all of which must read pressed
    Debounced { samples: u8 },
}

/// Source of a "pressed" reading for one travel extreme
pub trait LimitSense {
    /// Returns true if the switch reports the actuator at its extreme
    fn is_pressed(&mut self) -> bool;
}

/// Active-low limit switch on a digital input
pub struct LimitSwitch<P> {
    pin: P,
    policy: ReadPolicy,
}

impl<P: InputPin> LimitSwitch<P> {
    /// Create a switch with the given read policy
    pub fn new(pin: P, policy: ReadPolicy) -> Self {
        Self { pin, policy }
    }

    /// Single-sample switch
    pub fn direct(pin: P) -> Self {
        Self::new(pin, ReadPolicy::Direct)
    }

    /// Switch sampled `samples` times per evaluation
    pub fn debounced(pin: P, samples: u8) -> Self {
        Self::new(pin, ReadPolicy::Debounced { samples })
    }

    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    /// Evaluate the switch under its read policy
    pub fn read(&mut self) -> bool {
        match self.policy {
            ReadPolicy::Direct => self.sample(),
            // `all` stops at the first released sample
            ReadPolicy::Debounced { samples } => (0..samples.max(1)).all(|_| self.sample()),
        }
    }

    /// One raw sample. An unreadable input counts as pressed.
    fn sample(&mut self) -> bool {
        self.pin.is_low().unwrap_or(true)
    }

    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: InputPin + Wait> LimitSwitch<P> {
    /// Wait until the input disagrees with the level in `latch`, then read and publish it
    ///
    /// Returns at once if the input already disagrees. Returns the published reading.
    pub async fn watch(&mut self, latch: &LimitLatch) -> bool {
        let waited = if latch.pressed() {
            self.pin.wait_for_high().await
        } else {
            self.pin.wait_for_low().await
        };
        if waited.is_err() {
            crate::log_warn!("Limit input wait failed");
        }

        let pressed = self.read();
        latch.publish(pressed);
        pressed
    }
}

impl<P: InputPin> LimitSense for LimitSwitch<P> {
    fn is_pressed(&mut self) -> bool {
        self.read()
    }
}

/// Last switch level published by a limit watcher
///
/// Written from the task that owns the physical switch, read by the motor state machine
/// inside its critical section.
pub struct LimitLatch {
    pressed: AtomicBool,
}

impl LimitLatch {
    pub const fn new() -> Self {
        Self {
            pressed: AtomicBool::new(false),
        }
    }

    /// Store a fresh reading
    pub fn publish(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::Release);
    }

    pub fn pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }
}

impl Default for LimitLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl LimitSense for &LimitLatch {
    fn is_pressed(&mut self) -> bool {
        self.pressed()
    }
}
