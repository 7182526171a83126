//! Polled control loop
//!
//! Owns the controller when scheduling is polled. Every iteration:
//! 1. Apply the drive requests queued by the host link
//! 2. Run the limit and timeout checks of both motors
//! 3. Publish a fresh snapshot for status reads
//!
//! The loop period bounds how far a motor can overrun its limit.

use actuator_controller::system::config::POLL_INTERVAL;
use actuator_controller::system::queue;
use defmt::info;
use embassy_time::{Instant, Timer};

use crate::task::motors::{PolledController, DRIVE_QUEUE, SNAPSHOT};

#[embassy_executor::task]
pub async fn control_loop(mut controller: PolledController) {
    info!("Control loop running every {} ms", POLL_INTERVAL.as_millis());
    loop {
        queue::drain(&DRIVE_QUEUE, &mut controller);
        controller.check_state(Instant::now());
        SNAPSHOT.publish(controller.snapshot());
        Timer::after(POLL_INTERVAL).await;
    }
}
