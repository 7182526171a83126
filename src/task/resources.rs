//! Hardware Resource Management
//!
//! Allocates the board's pins and peripherals to the tasks that own them.
//!
//! # Resource Groups
//! - Motor 1 / Motor 2: H-bridge enable (PWM) and two direction pins each
//! - Limits: four active-low end-of-travel switches
//! - I2C link: host bus in slave mode
//! - Serial link: host UART
//! - Photodiodes: three ADC inputs

use assign_resources::assign_resources;
use embassy_rp::adc::InterruptHandler as AdcInterruptHandler;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::InterruptHandler as I2cInterruptHandler;
use embassy_rp::peripherals::{self, I2C0, UART0};
use embassy_rp::uart::BufferedInterruptHandler;

assign_resources! {
    /// Motor 1 H-bridge
    motor1: Motor1Resources {
        slice: PWM_SLICE1,
        enable_pin: PIN_2,
        in1_pin: PIN_3,
        in2_pin: PIN_4,
    },
    /// Motor 2 H-bridge
    motor2: Motor2Resources {
        slice: PWM_SLICE3,
        enable_pin: PIN_6,
        in1_pin: PIN_7,
        in2_pin: PIN_8,
    },
    /// End-of-travel switches, pressed pulls low
    limits: LimitResources {
        motor1_top: PIN_10,
        motor1_lower: PIN_11,
        motor2_top: PIN_12,
        motor2_lower: PIN_13,
    },
    /// Host I2C bus, we are the slave
    i2c_link: I2cLinkResources {
        i2c: I2C0,
        sda_pin: PIN_20,
        scl_pin: PIN_21,
    },
    /// Host serial port
    serial_link: SerialLinkResources {
        uart: UART0,
        tx_pin: PIN_16,
        rx_pin: PIN_17,
    },
    /// Photodiodes on the ADC capable pins
    photodiodes: PhotodiodeResources {
        adc: ADC,
        sensor0_pin: PIN_26,
        sensor1_pin: PIN_27,
        sensor2_pin: PIN_28,
    },
}

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});
