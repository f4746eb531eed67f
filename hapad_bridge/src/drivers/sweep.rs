//! Sweep driver: synthetic test pattern without hardware.
//!
//! Each tick both sticks advance 1000 report units and both triggers 5,
//! reversing direction at the range limits. Values are produced in device
//! units (scaled back through the mapping divisor) so that the regular
//! report mapper reproduces the pattern exactly.
//!
//! There is no tick source; the loop's fixed sleep is the only pacing.

use hapad_common::consts::{DOF, STICK_MAX, STICK_MIN, TRIGGER_MAX};
use hapad_common::device::driver::{Channel, DeviceError, HapticDevice};
use hapad_common::device::types::{ActuationCommand, JointArray, Vec3};
use tracing::info;

use crate::config::BridgeConfig;

/// Stick step per tick [report units].
pub const STICK_STEP: i32 = 1000;

/// Trigger step per tick [report units].
pub const TRIGGER_STEP: i32 = 5;

/// Triangle wave over an integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    value: i32,
    step: i32,
    min: i32,
    max: i32,
}

impl Triangle {
    /// Start at `start`, rising by `step` per advance.
    pub const fn new(start: i32, step: i32, min: i32, max: i32) -> Self {
        Self {
            value: start,
            step,
            min,
            max,
        }
    }

    /// Current value.
    #[inline]
    pub const fn value(&self) -> i32 {
        self.value
    }

    /// Move one step, saturating at the limits and reversing there.
    pub fn advance(&mut self) -> i32 {
        self.value = (self.value + self.step).clamp(self.min, self.max);
        if self.value == self.max || self.value == self.min {
            self.step = -self.step;
        }
        self.value
    }
}

/// Device producing the sweep pattern.
pub struct SweepDevice {
    divisor: f64,
    stick: Triangle,
    trigger: Triangle,
    opened: bool,
}

impl SweepDevice {
    /// Create a sweep device scaled for the configured mapping divisor.
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            divisor: config.mapping.divisor,
            stick: Triangle::new(0, STICK_STEP, i32::from(STICK_MIN), i32::from(STICK_MAX)),
            trigger: Triangle::new(0, TRIGGER_STEP, 0, i32::from(TRIGGER_MAX)),
            opened: false,
        }
    }

    fn to_device(&self, value: i32, full_scale: i32) -> f64 {
        f64::from(value) * self.divisor / f64::from(full_scale)
    }

    fn sample(&self, channel: Channel) -> Result<Vec3, DeviceError> {
        if !self.opened {
            return Err(DeviceError::Read {
                channel,
                reason: "device not open".to_string(),
            });
        }
        let s = self.to_device(self.stick.value(), i32::from(STICK_MAX));
        let t = self.to_device(self.trigger.value(), i32::from(TRIGGER_MAX));
        Ok([s, s, t])
    }
}

impl HapticDevice for SweepDevice {
    fn name(&self) -> &'static str {
        "sweep"
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        self.opened = true;
        info!("Sweep device opened");
        Ok(())
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn auto_init(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn move_to(&mut self, _position: &JointArray) -> Result<(), DeviceError> {
        Ok(())
    }

    fn has_tick_source(&self) -> bool {
        false
    }

    /// Advances the pattern by one step; never blocks.
    fn wait_for_tick(&mut self) {
        self.stick.advance();
        self.trigger.advance();
    }

    fn force(&mut self) -> Result<Vec3, DeviceError> {
        self.sample(Channel::Force)
    }

    fn position(&mut self) -> Result<Vec3, DeviceError> {
        self.sample(Channel::Position)
    }

    fn joint_angles(&mut self) -> Result<JointArray, DeviceError> {
        Ok([0.0; DOF])
    }

    fn joint_velocities(&mut self) -> Result<JointArray, DeviceError> {
        Ok([0.0; DOF])
    }

    fn command(&mut self, _command: &ActuationCommand) -> Result<(), DeviceError> {
        Ok(())
    }

    fn poll_key(&mut self) -> Option<char> {
        None
    }

    fn last_error(&self) -> String {
        String::new()
    }

    fn close(&mut self) {
        if self.opened {
            self.opened = false;
            info!("Sweep device closed");
        }
    }
}

/// Factory function to create a sweep driver instance.
pub fn create_driver(config: &BridgeConfig) -> Box<dyn HapticDevice> {
    Box::new(SweepDevice::new(config))
}
