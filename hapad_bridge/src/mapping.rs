//! Report mapper: device scalars → gamepad report fields.
//!
//! Position drives the left stick (X, Y) and left trigger (Z); force drives
//! the right stick and right trigger. Every value is scaled by
//! `full_scale / divisor`, rounded to nearest and saturated to the field's
//! range. Stateless and deterministic.

use hapad_common::consts::{DOF, STICK_MAX, STICK_MIN, TRIGGER_MAX};
use hapad_common::device::types::Vec3;
use hapad_common::gamepad::report::GamepadReport;

/// Default divisor: the device channel count.
pub const DEFAULT_DIVISOR: f64 = DOF as f64;

/// Map a scalar to a signed stick axis.
///
/// `round(value · 32767 / divisor)`, saturated to `[-32767, 32767]`.
/// Non-finite input maps to 0.
#[inline]
pub fn stick_map(value: f64, divisor: f64) -> i16 {
    let scaled = (value * f64::from(STICK_MAX) / divisor).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(f64::from(STICK_MIN), f64::from(STICK_MAX)) as i16
}

/// Map a scalar to an unsigned trigger.
///
/// `clamp(round(value · 255 / divisor), 0, 255)`. Non-finite input maps to 0.
#[inline]
pub fn trigger_map(value: f64, divisor: f64) -> u8 {
    let scaled = (value * f64::from(TRIGGER_MAX) / divisor).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, f64::from(TRIGGER_MAX)) as u8
}

/// Builds one [`GamepadReport`] per tick from position and force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportMapper {
    divisor: f64,
}

impl Default for ReportMapper {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_DIVISOR,
        }
    }
}

impl ReportMapper {
    /// Create a mapper with the given divisor. The caller guarantees
    /// `divisor > 0` (validated at config load).
    pub const fn new(divisor: f64) -> Self {
        Self { divisor }
    }

    /// Scaling divisor.
    pub const fn divisor(&self) -> f64 {
        self.divisor
    }

    /// Build a fresh report.
    pub fn map(&self, position: Vec3, force: Vec3) -> GamepadReport {
        let d = self.divisor;
        GamepadReport {
            thumb_lx: stick_map(position[0], d),
            thumb_ly: stick_map(position[1], d),
            left_trigger: trigger_map(position[2], d),
            thumb_rx: stick_map(force[0], d),
            thumb_ry: stick_map(force[1], d),
            right_trigger: trigger_map(force[2], d),
            ..GamepadReport::default()
        }
    }
}
