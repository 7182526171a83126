//! End-to-end flows over the host-facing API: command bytes in, status bytes out.

use std::cell::Cell;
use std::rc::Rc;

use actuator_controller::system::actuator::Actuator;
use actuator_controller::system::command::{Command, Encoding, Report};
use actuator_controller::system::controller::{Controller, SharedController};
use actuator_controller::system::error::Result;
use actuator_controller::system::limit_switch::{LimitLatch, LimitSense, LimitSwitch};
use actuator_controller::system::motor::{
    Direction, ErrorOnStart, MotorConfig, MotorId, MotorUnit, StopCause,
};
use actuator_controller::system::queue::{self, DriveQueue, QueuedPort, SnapshotCell};
use actuator_controller::system::router::{CommandRouter, MotorPort};
use actuator_controller::system::serial_line::LineParser;
use actuator_controller::system::status::StatusLine;
use embassy_futures::block_on;
use embassy_time::{Duration, Instant};
use embedded_hal::digital::{ErrorType, InputPin};
use embedded_hal_async::digital::Wait;

#[derive(Clone, Default)]
struct FakeBridge {
    driving: Rc<Cell<Option<Direction>>>,
}

impl Actuator for FakeBridge {
    fn drive(&mut self, direction: Direction) -> Result<()> {
        self.driving.set(Some(direction));
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.driving.set(None);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FakeLimit {
    pressed: Rc<Cell<bool>>,
}

impl FakeLimit {
    fn press(&self) {
        self.pressed.set(true);
    }

    fn release(&self) {
        self.pressed.set(false);
    }
}

impl LimitSense for FakeLimit {
    fn is_pressed(&mut self) -> bool {
        self.pressed.get()
    }
}

/// Handles on the fake hardware of one motor
#[derive(Clone, Default)]
struct MotorRig {
    bridge: FakeBridge,
    top: FakeLimit,
    lower: FakeLimit,
}

impl MotorRig {
    fn unit(&self, id: MotorId) -> MotorUnit<FakeBridge, FakeLimit> {
        MotorUnit::new(
            id,
            self.bridge.clone(),
            self.top.clone(),
            self.lower.clone(),
            MotorConfig {
                timeout: Duration::from_secs(10),
                error_on_start: ErrorOnStart::Retain,
            },
        )
    }

    fn driving(&self) -> Option<Direction> {
        self.bridge.driving.get()
    }
}

fn rigs() -> (MotorRig, MotorRig, Controller<FakeBridge, FakeLimit>) {
    let m1 = MotorRig::default();
    let m2 = MotorRig::default();
    let controller = Controller::new(m1.unit(MotorId::Motor1), m2.unit(MotorId::Motor2));
    (m1, m2, controller)
}

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

#[test]
fn i2c_commands_drive_and_select_report() {
    let (_m1, m2, controller) = rigs();
    let shared = SharedController::new();
    shared.init(controller);
    let mut router = CommandRouter::new(Encoding::Extended);

    assert_eq!(
        router.handle(0b110, &shared, at(0)),
        Some(Command::Drive {
            motor: MotorId::Motor2,
            direction: Direction::Up
        })
    );
    assert_eq!(m2.driving(), Some(Direction::Up));
    assert_eq!(router.response(&shared, 0b101), 0b0010);

    router.handle(0b001, &shared, at(10));
    assert_eq!(router.report(), Report::Sensors);
    assert_eq!(router.response(&shared, 0b101), 0b101);

    router.handle(0b000, &shared, at(20));
    assert_eq!(router.response(&shared, 0b101), 0b0010);
}

#[test]
fn start_against_pressed_limit_is_dropped() {
    let (m1, _m2, controller) = rigs();
    let shared = SharedController::new();
    shared.init(controller);
    let mut router = CommandRouter::new(Encoding::Extended);

    m1.lower.press();
    router.handle(0b101, &shared, at(0));

    assert_eq!(m1.driving(), None);
    assert_eq!(router.response(&shared, 0), 0);
}

#[test]
fn timeout_is_reported_until_next_limit_stop() {
    let (_m1, m2, controller) = rigs();
    let shared = SharedController::new();
    shared.init(controller);
    let mut router = CommandRouter::new(Encoding::Extended);

    router.handle(0b111, &shared, at(0));
    assert_eq!(shared.lock(|c| c.check_state(at(5_000))), Some([None, None]));
    assert_eq!(
        shared.lock(|c| c.check_state(at(10_001))),
        Some([None, Some(StopCause::Timeout)])
    );
    assert_eq!(m2.driving(), None);
    assert_eq!(router.response(&shared, 0), 0b0001);

    // A new run keeps the flag
    router.handle(0b111, &shared, at(20_000));
    assert_eq!(router.response(&shared, 0), 0b0011);

    m2.lower.press();
    assert_eq!(
        shared.lock(|c| c.check_limits(MotorId::Motor2)),
        Some(Some(StopCause::Limit))
    );
    assert_eq!(router.response(&shared, 0), 0);
}

#[test]
fn explicit_stop_keeps_error_flag() {
    let (m1, _m2, mut controller) = rigs();
    controller.motor_mut(MotorId::Motor1).set_error_state();
    controller.start(MotorId::Motor1, Direction::Up, at(0));

    controller.stop(MotorId::Motor1);

    assert_eq!(m1.driving(), None);
    assert_eq!(controller.snapshot().status_word(), 0b0100);
}

#[test]
fn uninitialised_controller_reports_idle() {
    let shared: SharedController<FakeBridge, FakeLimit> = SharedController::new();
    let mut router = CommandRouter::new(Encoding::Extended);

    router.handle(0b100, &shared, at(0));
    assert_eq!(router.response(&shared, 0), 0);
    assert_eq!(shared.lock(|c| c.check_state(at(0))), None);
}

#[test]
fn serial_lines_reach_the_motors() {
    let (m1, m2, controller) = rigs();
    let shared = SharedController::new();
    shared.init(controller);
    let mut parser = LineParser::new();
    let mut router = CommandRouter::new(Encoding::Tagged);

    // Motor 2 down, an untagged "3", then motor 1 up split over two reads
    let chunks: [&[u8]; 3] = [b"39\r\n3\n3", b"6\n", b"junk\n"];
    for chunk in chunks {
        for value in chunk.iter().filter_map(|&b| parser.push(b)) {
            router.handle(value, &shared, at(0));
        }
    }

    assert_eq!(m1.driving(), Some(Direction::Up));
    assert_eq!(m2.driving(), Some(Direction::Down));
}

#[test]
fn status_line_carries_limits_motors_and_sensors() {
    let (m1, m2, mut controller) = rigs();
    m1.top.press();
    m2.lower.press();
    controller.start(MotorId::Motor2, Direction::Up, at(0));

    let line = StatusLine::new(&controller.snapshot(), 0b110);
    let value = line.encode();

    assert_eq!(value >> 11, 0b1001);
    assert_eq!((value >> 7) & 0xF, 0b0010);
    assert_eq!(value & 0x7F, 0b110);

    m1.top.release();
    assert_eq!(controller.snapshot().limits, 0b0001);
}

#[test]
fn queued_port_hands_requests_to_control_loop() {
    let (m1, _m2, mut controller) = rigs();
    let drive_queue = DriveQueue::new();
    let snapshot = SnapshotCell::new();
    let port = QueuedPort::new(&drive_queue, &snapshot);
    let mut router = CommandRouter::new(Encoding::Extended);

    router.handle(0b100, &port, at(0));
    // Nothing moves until the loop runs
    assert_eq!(m1.driving(), None);
    assert_eq!(router.response(&port, 0), 0);

    assert_eq!(queue::drain(&drive_queue, &mut controller), 1);
    controller.check_state(at(1));
    snapshot.publish(controller.snapshot());

    assert_eq!(m1.driving(), Some(Direction::Up));
    assert_eq!(router.response(&port, 0), 0b1000);

    controller.check_state(at(10_001));
    snapshot.publish(controller.snapshot());
    assert_eq!(router.response(&port, 0), 0b0100);
}

#[test]
fn queued_requests_keep_host_timestamps() {
    let (_m1, _m2, mut controller) = rigs();
    let drive_queue = DriveQueue::new();
    let snapshot = SnapshotCell::new();
    let port = QueuedPort::new(&drive_queue, &snapshot);

    port.drive(MotorId::Motor1, Direction::Down, at(500));
    queue::drain(&drive_queue, &mut controller);

    assert_eq!(
        controller.motor(MotorId::Motor1).running_time(at(1_500)),
        Duration::from_secs(1)
    );
}

#[test]
fn full_queue_drops_extra_requests() {
    let (_m1, _m2, mut controller) = rigs();
    let drive_queue = DriveQueue::new();
    let snapshot = SnapshotCell::new();
    let port = QueuedPort::new(&drive_queue, &snapshot);

    for i in 0..10 {
        port.drive(MotorId::Motor2, Direction::from_bit(i), at(u64::from(i)));
    }

    assert_eq!(queue::drain(&drive_queue, &mut controller), 8);
    assert_eq!(queue::drain(&drive_queue, &mut controller), 0);
}

/// Limit latches for both motors, as published by the limit watchers
#[derive(Default)]
struct Latches {
    m1_top: LimitLatch,
    m1_lower: LimitLatch,
    m2_top: LimitLatch,
    m2_lower: LimitLatch,
}

impl Latches {
    fn controller(&self, m1: &FakeBridge, m2: &FakeBridge) -> Controller<FakeBridge, &LimitLatch> {
        let config = MotorConfig {
            timeout: Duration::from_secs(10),
            error_on_start: ErrorOnStart::Retain,
        };
        Controller::new(
            MotorUnit::new(MotorId::Motor1, m1.clone(), &self.m1_top, &self.m1_lower, config),
            MotorUnit::new(MotorId::Motor2, m2.clone(), &self.m2_top, &self.m2_lower, config),
        )
    }
}

/// Switch input that bounces through `levels` (`true` = low / pressed) and then holds the last one
struct SettlingPin {
    levels: Vec<bool>,
    reads: usize,
}

impl SettlingPin {
    fn settled_low(&self) -> bool {
        self.levels[self.levels.len() - 1]
    }
}

impl ErrorType for SettlingPin {
    type Error = core::convert::Infallible;
}

impl InputPin for SettlingPin {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        let level = self.levels[self.reads.min(self.levels.len() - 1)];
        self.reads += 1;
        Ok(level)
    }
}

impl Wait for SettlingPin {
    async fn wait_for_high(&mut self) -> core::result::Result<(), Self::Error> {
        assert!(!self.settled_low(), "input is low, wait would never return");
        Ok(())
    }

    async fn wait_for_low(&mut self) -> core::result::Result<(), Self::Error> {
        assert!(self.settled_low(), "input is high, wait would never return");
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> core::result::Result<(), Self::Error> {
        unimplemented!()
    }

    async fn wait_for_falling_edge(&mut self) -> core::result::Result<(), Self::Error> {
        unimplemented!()
    }

    async fn wait_for_any_edge(&mut self) -> core::result::Result<(), Self::Error> {
        unimplemented!()
    }
}

#[test]
fn latched_limits_gate_starts_from_the_router() {
    let latches = Latches::default();
    let (m1, m2) = (FakeBridge::default(), FakeBridge::default());
    let shared = SharedController::new();
    shared.init(latches.controller(&m1, &m2));
    let mut router = CommandRouter::new(Encoding::Extended);

    latches.m2_lower.publish(true);
    router.handle(0b111, &shared, at(0));
    assert_eq!(m2.driving.get(), None);
    assert_eq!(router.response(&shared, 0), 0);

    // The other direction is free
    router.handle(0b110, &shared, at(10));
    assert_eq!(m2.driving.get(), Some(Direction::Up));
    assert_eq!(router.response(&shared, 0), 0b0010);

    latches.m2_lower.publish(false);
    router.handle(0b111, &shared, at(20));
    assert_eq!(m2.driving.get(), Some(Direction::Down));
    assert_eq!(m1.driving.get(), None);
}

#[test]
fn latched_limit_stops_motor_and_clears_timeout_flag() {
    let latches = Latches::default();
    let (m1, m2) = (FakeBridge::default(), FakeBridge::default());
    let shared = SharedController::new();
    shared.init(latches.controller(&m1, &m2));
    let mut router = CommandRouter::new(Encoding::Extended);

    router.handle(0b100, &shared, at(0));
    assert_eq!(
        shared.lock(|c| c.check_state(at(10_001))),
        Some([Some(StopCause::Timeout), None])
    );
    assert_eq!(router.response(&shared, 0), 0b0100);

    router.handle(0b100, &shared, at(11_000));
    assert_eq!(router.response(&shared, 0), 0b1100);

    // Watcher sees the top switch close and runs the limit check right away
    latches.m1_top.publish(true);
    assert_eq!(
        shared.lock(|c| c.check_limits(MotorId::Motor1)),
        Some(Some(StopCause::Limit))
    );
    assert_eq!(m1.driving.get(), None);
    assert_eq!(router.response(&shared, 0), 0);

    // Pressed top still rejects another up run
    router.handle(0b100, &shared, at(12_000));
    assert_eq!(m1.driving.get(), None);
}

#[test]
fn switch_settling_during_a_read_still_stops_the_motor() {
    let latches = Latches::default();
    let (m1, m2) = (FakeBridge::default(), FakeBridge::default());
    let shared = SharedController::new();
    shared.init(latches.controller(&m1, &m2));
    let mut router = CommandRouter::new(Encoding::Extended);
    let mut top = LimitSwitch::debounced(
        SettlingPin {
            levels: vec![true, false, true],
            reads: 0,
        },
        10,
    );

    router.handle(0b100, &shared, at(0));
    assert_eq!(m1.driving.get(), Some(Direction::Up));

    // Edge arrives, the read lands on the bounce and publishes a release, then the switch
    // settles pressed without another edge
    latches.m1_top.publish(top.read());
    assert!(!latches.m1_top.pressed());

    assert!(block_on(top.watch(&latches.m1_top)));
    assert_eq!(
        shared.lock(|c| c.check_state(at(5_000))),
        Some([Some(StopCause::Limit), None])
    );
    assert_eq!(m1.driving.get(), None);
    assert_eq!(shared.lock(|c| c.check_state(at(10_001))), Some([None, None]));
    assert_eq!(router.response(&shared, 0), 0);
}
