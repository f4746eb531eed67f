//! Hapad Common Library
//!
//! Shared constants, configuration loading utilities and the contracts of the
//! two external collaborators driven by the bridge.
//!
//! # Module Structure
//!
//! - [`consts`] - Channel counts, wrist joint range, report limits, timing defaults
//! - [`config`] - Configuration loading traits and types
//! - [`device`] - Haptic device source contract (`HapticDevice`, `DeviceError`)
//! - [`gamepad`] - Virtual gamepad sink contract (`GamepadSink`, `GamepadReport`)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use hapad_common::prelude::*;
//!
//! let report = GamepadReport::default();
//! assert_eq!(report.thumb_lx, 0);
//! assert_eq!(DOF, 8);
//! ```

pub mod config;
pub mod consts;
pub mod device;
pub mod gamepad;
pub mod prelude;
