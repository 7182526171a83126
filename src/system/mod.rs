//! Core system components for actuator control
pub mod actuator;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod limit_switch;
pub mod logging;
pub mod motor;
pub mod queue;
pub mod router;
pub mod serial_line;
pub mod status;
