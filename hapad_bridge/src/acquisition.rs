//! Per-tick sample acquisition.
//!
//! Force and position reads gate the loop: a failure is returned to the
//! caller. Joint angle and velocity reads are best effort: a failure keeps
//! the previous tick's values and is counted.

use hapad_common::device::driver::{DeviceError, HapticDevice};
use hapad_common::device::types::DeviceSample;
use tracing::{debug, warn};

/// Owns the latest device sample.
#[derive(Debug, Clone, Default)]
pub struct SampleReader {
    sample: DeviceSample,
    joint_read_failures: u64,
}

impl SampleReader {
    /// Create a reader with an all-zero sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest sample.
    #[inline]
    pub const fn sample(&self) -> &DeviceSample {
        &self.sample
    }

    /// Number of joint reads that failed so far.
    pub const fn joint_read_failures(&self) -> u64 {
        self.joint_read_failures
    }

    /// Read joint angles and velocities (best effort).
    pub fn read_joints(&mut self, device: &mut dyn HapticDevice) {
        match device.joint_angles() {
            Ok(angles) => self.sample.joint_angles = angles,
            Err(e) => self.note_joint_failure(&e),
        }
        match device.joint_velocities() {
            Ok(velocities) => self.sample.joint_velocities = velocities,
            Err(e) => self.note_joint_failure(&e),
        }
    }

    /// Read Cartesian force then position.
    ///
    /// # Errors
    /// Returns the device error of the first failing read; the sample keeps
    /// whatever was read before the failure.
    pub fn read_cartesian(&mut self, device: &mut dyn HapticDevice) -> Result<(), DeviceError> {
        self.sample.force = device.force()?;
        self.sample.position = device.position()?;
        Ok(())
    }

    fn note_joint_failure(&mut self, err: &DeviceError) {
        self.joint_read_failures += 1;
        if self.joint_read_failures == 1 {
            warn!("Joint read failed, keeping previous values: {err}");
        } else {
            debug!("Joint read failure #{}: {err}", self.joint_read_failures);
        }
    }
}
