//! Prelude module for common re-exports.
//!
//! ```rust
//! use hapad_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{DOF, STICK_MAX, STICK_MIN, TRIGGER_MAX, WRIST_COUNT, WRIST_JOINTS};

// ─── Device ─────────────────────────────────────────────────────────
pub use crate::device::driver::{Channel, DeviceError, HapticDevice};
pub use crate::device::types::{ActuationCommand, DeviceSample, JointArray, Vec3, WristTorques};

// ─── Gamepad ────────────────────────────────────────────────────────
pub use crate::gamepad::report::GamepadReport;
pub use crate::gamepad::sink::{GamepadSink, SinkError};
