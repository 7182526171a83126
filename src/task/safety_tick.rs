//! Periodic safety check
//!
//! Interrupt-driven scheduling only. Runs the limit and timeout checks of both motors on a
//! fixed tick, inside the controller's critical section.

use actuator_controller::system::config::SAFETY_TICK;
use embassy_time::{Instant, Ticker};

use crate::task::motors::SHARED;

#[embassy_executor::task]
pub async fn safety_tick() {
    let mut ticker = Ticker::every(SAFETY_TICK);
    loop {
        ticker.next().await;
        let now = Instant::now();
        SHARED.lock(|c| c.check_state(now));
    }
}
