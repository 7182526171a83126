pub mod control_loop;
pub mod debug_report;
pub mod i2c_link;
pub mod limit_watch;
pub mod motors;
pub mod photodiodes;
pub mod resources;
pub mod safety_tick;
pub mod serial_link;
