//! Actuator controller firmware entry point
//!
//! Initializes the board, builds the motors for the configured scheduling model and spawns the
//! host link for the configured transport.

#![no_std]
#![no_main]

use actuator_controller::system::config::{self, Scheduling, Transport};
use actuator_controller::system::motor::MotorId;
use actuator_controller::system::router::MotorPort;
use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use task::resources::{
    AssignedResources, I2cLinkResources, LimitResources, Motor1Resources, Motor2Resources,
    PhotodiodeResources, SerialLinkResources,
};
use {defmt_rtt as _, panic_probe as _};

use crate::task::{
    control_loop::control_loop,
    debug_report::debug_report,
    i2c_link::i2c_link,
    limit_watch::limit_watch,
    motors::{self, MOTOR1_LOWER, MOTOR1_TOP, MOTOR2_LOWER, MOTOR2_TOP, QUEUED, SHARED},
    photodiodes::photodiodes,
    safety_tick::safety_tick,
    serial_link::serial_link,
};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups for each task
    let r = split_resources!(p);

    info!(
        "Actuator controller: {:?} scheduling, {:?} link",
        config::SCHEDULING,
        config::TRANSPORT
    );

    let motor1 = motors::motor1_stage(r.motor1);
    let motor2 = motors::motor2_stage(r.motor2);
    let limits = motors::limit_switches(r.limits);

    let port: &'static (dyn MotorPort + Sync) = match config::SCHEDULING {
        Scheduling::Interrupt => {
            // Controller must be in place before anything can lock it
            SHARED.init(motors::latched_controller(motor1, motor2));

            let [m1_top, m1_lower, m2_top, m2_lower] = limits;
            spawner
                .spawn(limit_watch(m1_top, &MOTOR1_TOP, MotorId::Motor1))
                .unwrap();
            spawner
                .spawn(limit_watch(m1_lower, &MOTOR1_LOWER, MotorId::Motor1))
                .unwrap();
            spawner
                .spawn(limit_watch(m2_top, &MOTOR2_TOP, MotorId::Motor2))
                .unwrap();
            spawner
                .spawn(limit_watch(m2_lower, &MOTOR2_LOWER, MotorId::Motor2))
                .unwrap();
            spawner.spawn(safety_tick()).unwrap();
            &SHARED
        }
        Scheduling::Polling => {
            spawner
                .spawn(control_loop(motors::polled_controller(motor1, motor2, limits)))
                .unwrap();
            &QUEUED
        }
    };

    spawner.spawn(photodiodes(r.photodiodes)).unwrap();
    match config::TRANSPORT {
        Transport::I2c => spawner.spawn(i2c_link(r.i2c_link, port)).unwrap(),
        Transport::Serial => spawner.spawn(serial_link(r.serial_link, port)).unwrap(),
    }
    spawner.spawn(debug_report(port)).unwrap();
}
