//! Device sample types.
//!
//! All channel arrays have the fixed length [`DOF`] for the lifetime of a
//! session. Index 0 of the device's internal buffer is the only "current"
//! value; nothing here is buffered or interpolated.

use crate::consts::{DOF, WRIST_COUNT};

/// Cartesian triple (x, y, z).
pub type Vec3 = [f64; 3];

/// One value per device channel.
pub type JointArray = [f64; DOF];

/// Torques for the lockable wrist joints, in wrist order.
pub type WristTorques = [f64; WRIST_COUNT];

/// Snapshot of the device state read during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSample {
    /// Cartesian force [N].
    pub force: Vec3,
    /// Cartesian position [m], workspace-normalized by the device.
    pub position: Vec3,
    /// Joint angles [rad].
    pub joint_angles: JointArray,
    /// Joint velocities [rad/s].
    pub joint_velocities: JointArray,
}

impl Default for DeviceSample {
    fn default() -> Self {
        Self {
            force: [0.0; 3],
            position: [0.0; 3],
            joint_angles: [0.0; DOF],
            joint_velocities: [0.0; DOF],
        }
    }
}

/// Combined actuation command issued once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuationCommand {
    /// Linear force [N].
    pub force: Vec3,
    /// Wrist joint torques [Nm].
    pub wrist_torques: WristTorques,
    /// Gripper force [N].
    pub gripper: f64,
}

impl ActuationCommand {
    /// Command carrying only wrist torques; linear and gripper force are zero.
    pub const fn wrist_only(wrist_torques: WristTorques) -> Self {
        Self {
            force: [0.0; 3],
            wrist_torques,
            gripper: 0.0,
        }
    }
}
