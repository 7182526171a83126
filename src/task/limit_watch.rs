//! Limit switch watcher
//!
//! Interrupt-driven scheduling only. One task per switch waits until the input level disagrees
//! with the published reading, re-reads the switch under the configured read policy and
//! publishes the result. A press runs the limit check of the owning motor right away instead of
//! waiting for the next safety tick.
//!
//! Waiting on a level rather than an edge means a switch that settles while a read is running
//! is seen on the next pass.

use actuator_controller::system::limit_switch::LimitLatch;
use actuator_controller::system::motor::MotorId;
use defmt::{debug, info};

use crate::task::motors::{BoardLimit, SHARED};

/// Watcher for one limit switch
#[embassy_executor::task(pool_size = 4)]
pub async fn limit_watch(mut switch: BoardLimit, latch: &'static LimitLatch, motor: MotorId) {
    info!("{:?} limit watcher, {:?}", motor, switch.policy());

    // Catch a switch that is already pressed at boot
    latch.publish(switch.read());

    loop {
        let pressed = switch.watch(latch).await;
        debug!("{:?} limit pressed: {}", motor, pressed);

        if pressed {
            SHARED.lock(|c| c.check_limits(motor));
        }
    }
}
