//! Periodic diagnostic dump
//!
//! Logs both motors, the limit bits and the sensor bits every few seconds.

use actuator_controller::system::config::DEBUG_REPORT_INTERVAL;
use actuator_controller::system::motor::MotorId;
use actuator_controller::system::router::MotorPort;
use defmt::info;
use embassy_time::Ticker;

use crate::task::photodiodes;

#[embassy_executor::task]
pub async fn debug_report(port: &'static (dyn MotorPort + Sync)) {
    let mut ticker = Ticker::every(DEBUG_REPORT_INTERVAL);
    loop {
        ticker.next().await;
        let snapshot = port.snapshot();
        for id in MotorId::ALL {
            let motor = snapshot.motors[id.index()];
            info!(
                "{:?}: moving {} direction {:?} error {}",
                id,
                motor.moving,
                motor.direction,
                motor.error
            );
        }
        info!(
            "Status {=u8:b} limits {=u8:b} sensors {=u8:b}",
            snapshot.status_word(),
            snapshot.limits,
            photodiodes::sensor_bits()
        );
    }
}
