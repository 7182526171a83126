//! Motor hardware setup
//!
//! Builds the H-bridge drive stages and holds the statics both scheduling models hand out:
//! - Interrupt-driven: [`SHARED`] holds the controller, limit watchers publish into the
//!   four [`LimitLatch`]es it reads
//! - Polling: the control loop owns the controller, host links reach it through [`QUEUED`]

use actuator_controller::system::actuator::HBridge;
use actuator_controller::system::config;
use actuator_controller::system::controller::{Controller, SharedController};
use actuator_controller::system::limit_switch::{LimitLatch, LimitSwitch};
use actuator_controller::system::motor::{MotorId, MotorUnit};
use actuator_controller::system::queue::{DriveQueue, QueuedPort, SnapshotCell};
use defmt::info;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{self, Pwm, PwmOutput};

use crate::task::resources::{LimitResources, Motor1Resources, Motor2Resources};

/// One H-bridge channel on the board
pub type DriveStage = HBridge<PwmOutput<'static>, Output<'static>, Output<'static>>;

/// Limit switch on a GPIO input
pub type BoardLimit = LimitSwitch<Input<'static>>;

/// Controller reading limits from the edge watchers
pub type LatchedController = Controller<DriveStage, &'static LimitLatch>;

/// Controller sampling limits itself
pub type PolledController = Controller<DriveStage, BoardLimit>;

pub static SHARED: SharedController<DriveStage, &'static LimitLatch> = SharedController::new();

pub static MOTOR1_TOP: LimitLatch = LimitLatch::new();
pub static MOTOR1_LOWER: LimitLatch = LimitLatch::new();
pub static MOTOR2_TOP: LimitLatch = LimitLatch::new();
pub static MOTOR2_LOWER: LimitLatch = LimitLatch::new();

pub static DRIVE_QUEUE: DriveQueue = DriveQueue::new();
pub static SNAPSHOT: SnapshotCell = SnapshotCell::new();
pub static QUEUED: QueuedPort<'static> = QueuedPort::new(&DRIVE_QUEUE, &SNAPSHOT);

/// PWM frequency on the enable inputs
const ENABLE_PWM_HZ: u32 = 10_000;

fn enable_pwm_config() -> pwm::Config {
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();

    // Smallest divider that keeps the period within 16 bits
    let divider = ((clock_freq_hz / ENABLE_PWM_HZ) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (ENABLE_PWM_HZ * divider as u32)) as u16 - 1;

    let mut config = pwm::Config::default();
    config.divider = divider.into();
    config.top = period;
    // Idle level of the enable input is full duty
    config.compare_a = period;
    config
}

pub fn motor1_stage(r: Motor1Resources) -> DriveStage {
    let (enable, _) = Pwm::new_output_a(r.slice, r.enable_pin, enable_pwm_config()).split();
    HBridge::new(
        enable.expect("motor 1 enable channel not configured"),
        Output::new(r.in1_pin, Level::Low),
        Output::new(r.in2_pin, Level::Low),
    )
}

pub fn motor2_stage(r: Motor2Resources) -> DriveStage {
    let (enable, _) = Pwm::new_output_a(r.slice, r.enable_pin, enable_pwm_config()).split();
    HBridge::new(
        enable.expect("motor 2 enable channel not configured"),
        Output::new(r.in1_pin, Level::Low),
        Output::new(r.in2_pin, Level::Low),
    )
}

fn limit_pull() -> Pull {
    if config::LIMIT_PULL_UP {
        Pull::Up
    } else {
        Pull::None
    }
}

/// The four limit switches: motor 1 top, motor 1 lower, motor 2 top, motor 2 lower
pub fn limit_switches(r: LimitResources) -> [BoardLimit; 4] {
    let pull = limit_pull();
    [
        LimitSwitch::new(Input::new(r.motor1_top, pull), config::LIMIT_READ_POLICY),
        LimitSwitch::new(Input::new(r.motor1_lower, pull), config::LIMIT_READ_POLICY),
        LimitSwitch::new(Input::new(r.motor2_top, pull), config::LIMIT_READ_POLICY),
        LimitSwitch::new(Input::new(r.motor2_lower, pull), config::LIMIT_READ_POLICY),
    ]
}

/// Controller for interrupt-driven scheduling, limits read from the latches
pub fn latched_controller(motor1: DriveStage, motor2: DriveStage) -> LatchedController {
    info!("Motors: limits latched by edge watchers");
    Controller::new(
        MotorUnit::new(MotorId::Motor1, motor1, &MOTOR1_TOP, &MOTOR1_LOWER, config::MOTOR),
        MotorUnit::new(MotorId::Motor2, motor2, &MOTOR2_TOP, &MOTOR2_LOWER, config::MOTOR),
    )
}

/// Controller for polled scheduling, limits sampled on every check
pub fn polled_controller(
    motor1: DriveStage,
    motor2: DriveStage,
    limits: [BoardLimit; 4],
) -> PolledController {
    info!("Motors: limits sampled by the control loop");
    let [m1_top, m1_lower, m2_top, m2_lower] = limits;
    Controller::new(
        MotorUnit::new(MotorId::Motor1, motor1, m1_top, m1_lower, config::MOTOR),
        MotorUnit::new(MotorId::Motor2, motor2, m2_top, m2_lower, config::MOTOR),
    )
}
