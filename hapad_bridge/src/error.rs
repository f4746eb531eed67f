//! Bridge error taxonomy.
//!
//! Startup failures are [`InitError`]; mid-loop failures are either a sensor
//! read ([`BridgeError::SensorRead`]) or an actuation ([`ActuationError`]).
//! None of them is retried: every one ends the run after an orderly teardown.

use hapad_common::config::ConfigError;
use hapad_common::device::driver::DeviceError;
use hapad_common::gamepad::sink::SinkError;
use thiserror::Error;

/// Startup failure of the device session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    /// Haptic device open / support / calibration / start / homing failure.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Virtual sink allocation / connection / attach failure.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Failure to push output to either collaborator during the loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActuationError {
    /// The haptic device rejected the force/torque command.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The virtual gamepad rejected the report.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Top-level bridge error.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// Startup failure.
    #[error("startup failed: {0}")]
    Init(#[from] InitError),

    /// Mid-loop sensing failure.
    #[error("sensor read failed: {0}")]
    SensorRead(DeviceError),

    /// Mid-loop actuation or sink update failure.
    #[error("actuation failed: {0}")]
    Actuation(#[from] ActuationError),

    /// Configuration loading or validation failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No driver registered under the requested name.
    #[error("driver not found: {0}")]
    DriverNotFound(String),

    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),
}

impl BridgeError {
    /// Whether the error happened before the control loop started.
    pub const fn is_init(&self) -> bool {
        matches!(
            self,
            Self::Init(_) | Self::Config(_) | Self::DriverNotFound(_) | Self::RtSetup(_)
        )
    }
}
