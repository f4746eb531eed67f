//! Haptic device trait and error types.
//!
//! This module defines:
//! - `HapticDevice` trait - Interface for haptic device backends
//! - `DeviceError` enum - Error types for device operations
//! - `Channel` enum - Sensor channel named in read failures

use crate::device::types::{ActuationCommand, JointArray, Vec3};
use std::fmt;
use thiserror::Error;

/// Sensor channel named in read failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Cartesian force.
    Force,
    /// Cartesian position.
    Position,
    /// Joint angles.
    JointAngles,
    /// Joint velocities.
    JointVelocities,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Force => "force",
            Self::Position => "position",
            Self::JointAngles => "joint angles",
            Self::JointVelocities => "joint velocities",
        };
        f.write_str(name)
    }
}

/// Error types for haptic device operations.
///
/// Each variant carries the device's last error string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    /// The device could not be opened.
    #[error("failed to open haptic device: {0}")]
    Open(String),

    /// The connected device type is not supported.
    #[error("unsupported device type: {0}")]
    Unsupported(String),

    /// Calibration auto-initialization failed.
    #[error("failed to initialize device: {0}")]
    Init(String),

    /// The regulation thread could not be started.
    #[error("failed to start robotic regulation: {0}")]
    Start(String),

    /// Moving to the home position failed.
    #[error("failed to move the device to home: {0}")]
    Homing(String),

    /// A sensor read failed.
    #[error("failed to read {channel}: {reason}")]
    Read {
        /// Channel that failed.
        channel: Channel,
        /// Device-reported reason.
        reason: String,
    },

    /// An actuation command was rejected.
    #[error("cannot set force: {0}")]
    Command(String),
}

/// Trait defining the interface of a haptic device source.
///
/// # Lifecycle
///
/// 1. `open()` / `is_supported()` / `auto_init()` / `start()` / `move_to()` - startup
/// 2. `wait_for_tick()`, reads, `command()`, `poll_key()` - every tick
/// 3. `close()` - on every exit path, idempotent
///
/// # Timing Contracts
///
/// | Operation | Blocking | RT Constraint |
/// |-----------|----------|---------------|
/// | startup calls | yes | None (pre-loop) |
/// | `wait_for_tick()` | until next servo tick | slaves the loop |
/// | reads / `command()` / `poll_key()` | no | **HARD** |
/// | `close()` | may block | None (post-loop) |
pub trait HapticDevice: Send {
    /// Returns the driver's unique identifier (e.g., "simulation", "sweep").
    fn name(&self) -> &'static str;

    /// Open a connection to the device.
    fn open(&mut self) -> Result<(), DeviceError>;

    /// Whether the connected device type is supported for regulation.
    fn is_supported(&self) -> bool;

    /// Whether calibration has already been performed.
    fn is_initialized(&self) -> bool;

    /// Run calibration auto-initialization.
    fn auto_init(&mut self) -> Result<(), DeviceError>;

    /// Start the device's regulation thread.
    fn start(&mut self) -> Result<(), DeviceError>;

    /// Drive the device to the given joint-space position and hold it.
    fn move_to(&mut self, position: &JointArray) -> Result<(), DeviceError>;

    /// Set the integral gain of the encoder regulator.
    ///
    /// Default: accepted without effect.
    fn set_enc_i_gain(&mut self, _gain: f64) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Whether `wait_for_tick()` is paced by the device's servo clock.
    fn has_tick_source(&self) -> bool;

    /// Block until the next servo tick boundary.
    ///
    /// Devices without a tick source return immediately.
    fn wait_for_tick(&mut self);

    /// Read the Cartesian force.
    fn force(&mut self) -> Result<Vec3, DeviceError>;

    /// Read the Cartesian position.
    fn position(&mut self) -> Result<Vec3, DeviceError>;

    /// Read all joint angles.
    fn joint_angles(&mut self) -> Result<JointArray, DeviceError>;

    /// Read all joint velocities.
    fn joint_velocities(&mut self) -> Result<JointArray, DeviceError>;

    /// Apply a combined force, wrist torque and gripper command.
    fn command(&mut self, command: &ActuationCommand) -> Result<(), DeviceError>;

    /// Non-blocking key poll. Returns the next pending key press, if any.
    fn poll_key(&mut self) -> Option<char>;

    /// Last error string reported by the device.
    fn last_error(&self) -> String;

    /// Release the device. Must be idempotent.
    fn close(&mut self);
}
