#![cfg_attr(not(test), no_std)]

//! Dual linear actuator controller
//!
//! Hardware-independent part of the firmware: the motor safety state machine, limit switch
//! sampling, the host command protocol and status packing. Everything here builds for the
//! board (feature `rp2350`) and for host tests.

/// Core system components
pub mod system;
