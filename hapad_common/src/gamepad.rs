//! Virtual gamepad sink contract.
//!
//! The sink exposes one virtual gamepad target to the host and accepts a
//! fixed-layout [`report::GamepadReport`] once per tick.

pub mod report;
pub mod sink;
