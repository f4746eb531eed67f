//! Simulation driver module.
//!
//! This module provides a simulated haptic device for development and
//! testing without physical hardware.

mod driver;
mod physics;

pub use driver::SimulationDriver;
pub use physics::{HandMotion, WALL_STIFFNESS, WristJointSim, wall_force};

use hapad_common::device::driver::HapticDevice;

use crate::config::BridgeConfig;

/// Factory function to create a simulation driver instance.
pub fn create_driver(config: &BridgeConfig) -> Box<dyn HapticDevice> {
    Box::new(SimulationDriver::new(&config.simulation))
}
