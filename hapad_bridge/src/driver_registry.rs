//! Driver registry for device and sink drivers.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving device
//! and sink factories by name. Constructed at startup and passed by value;
//! there is no global registry.

use std::collections::HashMap;

use hapad_common::device::driver::HapticDevice;
use hapad_common::gamepad::sink::GamepadSink;

use crate::config::BridgeConfig;
use crate::error::BridgeError;

/// Factory function type for creating device instances.
pub type DeviceFactory = fn(&BridgeConfig) -> Box<dyn HapticDevice>;

/// Factory function type for creating sink instances.
pub type SinkFactory = fn(&BridgeConfig) -> Box<dyn GamepadSink>;

/// Registry of available device and sink drivers.
pub struct DriverRegistry {
    devices: HashMap<&'static str, DeviceFactory>,
    sinks: HashMap<&'static str, SinkFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            devices: HashMap::new(),
            sinks: HashMap::new(),
        }
    }

    /// Register a device factory.
    ///
    /// # Panics
    /// Panics if a device driver with the same name is already registered.
    pub fn register_device(&mut self, name: &'static str, factory: DeviceFactory) {
        if self.devices.contains_key(name) {
            panic!("Device driver '{name}' is already registered");
        }
        self.devices.insert(name, factory);
    }

    /// Register a sink factory.
    ///
    /// # Panics
    /// Panics if a sink driver with the same name is already registered.
    pub fn register_sink(&mut self, name: &'static str, factory: SinkFactory) {
        if self.sinks.contains_key(name) {
            panic!("Sink driver '{name}' is already registered");
        }
        self.sinks.insert(name, factory);
    }

    /// Create a device instance by name.
    ///
    /// # Errors
    /// Returns `BridgeError::DriverNotFound` if no device driver has that name.
    pub fn create_device(
        &self,
        name: &str,
        config: &BridgeConfig,
    ) -> Result<Box<dyn HapticDevice>, BridgeError> {
        let factory = self
            .devices
            .get(name)
            .ok_or_else(|| BridgeError::DriverNotFound(format!("device '{name}'")))?;
        Ok(factory(config))
    }

    /// Create a sink instance by name.
    ///
    /// # Errors
    /// Returns `BridgeError::DriverNotFound` if no sink driver has that name.
    pub fn create_sink(
        &self,
        name: &str,
        config: &BridgeConfig,
    ) -> Result<Box<dyn GamepadSink>, BridgeError> {
        let factory = self
            .sinks
            .get(name)
            .ok_or_else(|| BridgeError::DriverNotFound(format!("sink '{name}'")))?;
        Ok(factory(config))
    }

    /// List registered device driver names, sorted.
    pub fn list_devices(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.devices.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// List registered sink driver names, sorted.
    pub fn list_sinks(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.sinks.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
