//! Built-in device and sink drivers.
//!
//! - [`simulation`] - Simulated haptic device with wrist dynamics
//! - [`sweep`] - Synthetic stick/trigger sweep pattern, no hardware
//! - [`log_sink`] - In-process gamepad sink that logs reports
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `HapticDevice` or `GamepadSink` from `hapad_common`
//! 3. Register its factory in [`builtin_registry`]

pub mod log_sink;
pub mod simulation;
pub mod sweep;

use crate::driver_registry::DriverRegistry;

/// Build a registry holding every built-in driver.
pub fn builtin_registry() -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    registry.register_device("simulation", simulation::create_driver);
    registry.register_device("sweep", sweep::create_driver);
    registry.register_sink("log", log_sink::create_driver);
    registry
}
