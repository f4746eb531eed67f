//! System-wide constants for the hapad workspace.
//!
//! Single source of truth for channel counts, report limits and timing
//! defaults. Imported by all crates.

use static_assertions::const_assert;
use std::ops::Range;

/// Number of scalar channels per device state array.
///
/// Also the default divisor of the report mapper.
pub const DOF: usize = 8;

/// First wrist joint index (lockable).
pub const WRIST_FIRST: usize = 3;

/// Number of wrist joints (lockable).
pub const WRIST_COUNT: usize = 3;

/// Lockable wrist joint indices.
pub const WRIST_JOINTS: Range<usize> = WRIST_FIRST..WRIST_FIRST + WRIST_COUNT;

/// Largest stick value accepted by the sink.
pub const STICK_MAX: i16 = 32767;

/// Smallest stick value accepted by the sink (symmetric range).
pub const STICK_MIN: i16 = -32767;

/// Largest trigger value.
pub const TRIGGER_MAX: u8 = 255;

/// Default pacing sleep after each tick [µs] (≈1 kHz).
pub const DEFAULT_TICK_SLEEP_US: u64 = 1000;

/// Default simulated servo period [µs].
pub const DEFAULT_SERVO_PERIOD_US: u64 = 1000;

/// Default regulation stiffness per channel [Nm/rad].
pub const DEFAULT_STIFFNESS: [f64; DOF] = [0.0, 0.0, 0.0, 4.0, 3.0, 1.0, 0.0, 0.0];

/// Default regulation viscosity per channel [Nm·s/rad].
pub const DEFAULT_VISCOSITY: [f64; DOF] = [0.0, 0.0, 0.0, 0.04, 0.03, 0.01, 0.0, 0.0];

const_assert!(WRIST_FIRST + WRIST_COUNT <= DOF);
const_assert!(STICK_MIN == -STICK_MAX);
