//! # Haptic Gamepad Bridge
//!
//! Fixed-rate bridge from a force-feedback haptic device to a virtual
//! gamepad, with an optional joint-lock regulator on the wrist joints.
//!
//! # Module Structure
//!
//! - [`config`] - TOML configuration and validation
//! - [`error`] - Error taxonomy
//! - [`session`] - Device and sink lifecycle, teardown ordering
//! - [`acquisition`] - Per-tick sensor reads
//! - [`regulator`] - Wrist joint lock spring-damper
//! - [`command`] - Key commands and the key queue
//! - [`mapping`] - Device scalars to gamepad report
//! - [`cycle`] - Control loop, stop flag, cycle statistics, RT setup
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Built-in drivers
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          hapad_bridge                          │
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐  │
//! │  │ HapticDevice │◄──►│ CycleRunner  │◄──►│   GamepadSink    │  │
//! │  │   (trait)    │    │ (fixed rate) │    │     (trait)      │  │
//! │  └──────────────┘    └──────┬───────┘    └──────────────────┘  │
//! │                             │                                  │
//! │             ┌───────────────┼────────────────┐                 │
//! │             ▼               ▼                ▼                 │
//! │     JointLockRegulator  KeyCommand     ReportMapper            │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod acquisition;
pub mod command;
pub mod config;
pub mod cycle;
pub mod driver_registry;
pub mod drivers;
pub mod error;
pub mod mapping;
pub mod regulator;
pub mod session;

// Re-export key types for convenience
pub use crate::cycle::{CycleRunner, StopFlag};
pub use crate::driver_registry::DriverRegistry;
pub use crate::error::{ActuationError, BridgeError, InitError};
pub use crate::session::Session;
