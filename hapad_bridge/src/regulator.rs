//! Joint lock regulator: per-wrist-joint virtual spring-damper.
//!
//! Each wrist joint is either `Unlocked` (zero torque) or `Locked` around a
//! captured target angle:
//!
//! ```text
//! τ = −k · (θ − θ_target) − c · ω
//! ```
//!
//! The target is captured from the joint's current angle at the moment of
//! the toggle, never from an earlier cached value. Non-wrist channels carry
//! zero torque and cannot be locked.

use hapad_common::consts::{DOF, DEFAULT_STIFFNESS, DEFAULT_VISCOSITY, WRIST_COUNT};
use hapad_common::device::types::{JointArray, WristTorques};
use tracing::debug;

use crate::command::{KeyCommand, WristJoint};

/// Lock state of one wrist joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    /// No torque contribution.
    #[default]
    Unlocked,
    /// Spring-damper around the captured target.
    Locked,
}

impl LockState {
    const fn from_bool(locked: bool) -> Self {
        if locked { Self::Locked } else { Self::Unlocked }
    }
}

/// Regulation gains, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegulatorGains {
    /// Stiffness per channel [Nm/rad].
    pub stiffness: JointArray,
    /// Viscosity per channel [Nm·s/rad].
    pub viscosity: JointArray,
}

impl Default for RegulatorGains {
    fn default() -> Self {
        Self {
            stiffness: DEFAULT_STIFFNESS,
            viscosity: DEFAULT_VISCOSITY,
        }
    }
}

/// Spring-damper torque for one joint.
#[inline]
pub fn joint_torque(angle: f64, target: f64, velocity: f64, stiffness: f64, viscosity: f64) -> f64 {
    -stiffness * (angle - target) - viscosity * velocity
}

/// Per-joint lock set with captured targets.
#[derive(Debug, Clone)]
pub struct JointLockRegulator {
    gains: RegulatorGains,
    locked: [bool; DOF],
    target: JointArray,
}

impl JointLockRegulator {
    /// Create a regulator with every joint unlocked.
    pub const fn new(gains: RegulatorGains) -> Self {
        Self {
            gains,
            locked: [false; DOF],
            target: [0.0; DOF],
        }
    }

    /// Regulation gains.
    pub const fn gains(&self) -> &RegulatorGains {
        &self.gains
    }

    /// Lock state of a joint.
    #[inline]
    pub const fn state(&self, joint: WristJoint) -> LockState {
        LockState::from_bool(self.locked[joint.channel()])
    }

    /// Captured target of a joint; `None` while unlocked.
    #[inline]
    pub const fn target(&self, joint: WristJoint) -> Option<f64> {
        if self.locked[joint.channel()] {
            Some(self.target[joint.channel()])
        } else {
            None
        }
    }

    /// Stored target of a joint, whether or not it is locked.
    #[cfg(test)]
    pub(crate) const fn captured(&self, joint: WristJoint) -> f64 {
        self.target[joint.channel()]
    }

    /// Flip one joint's lock and recapture its target from `angles`.
    ///
    /// The target is recaptured on every toggle, including unlocks.
    pub fn toggle(&mut self, joint: WristJoint, angles: &JointArray) -> LockState {
        let ch = joint.channel();
        self.locked[ch] = !self.locked[ch];
        self.target[ch] = angles[ch];
        let state = LockState::from_bool(self.locked[ch]);
        debug!(joint = ch, ?state, target = self.target[ch], "Wrist lock toggled");
        state
    }

    /// Set every wrist joint to the negation of joint 0's current state.
    ///
    /// Joints 1 and 2 follow joint 0 rather than flipping independently.
    /// Targets are recaptured only when the new state is `Locked`.
    pub fn toggle_all(&mut self, angles: &JointArray) -> LockState {
        let next = !self.locked[WristJoint::J0.channel()];
        for joint in WristJoint::ALL {
            let ch = joint.channel();
            self.locked[ch] = next;
            if next {
                self.target[ch] = angles[ch];
            }
        }
        let state = LockState::from_bool(next);
        debug!(?state, "All wrist locks set");
        state
    }

    /// Apply a toggle command. `Quit` is not a regulator command and is ignored.
    pub fn apply(&mut self, command: KeyCommand, angles: &JointArray) {
        match command {
            KeyCommand::ToggleJoint(joint) => {
                self.toggle(joint, angles);
            }
            KeyCommand::ToggleAll => {
                self.toggle_all(angles);
            }
            KeyCommand::Quit => {}
        }
    }

    /// Torques for the wrist joints given the current angles and velocities.
    pub fn wrist_torques(&self, angles: &JointArray, velocities: &JointArray) -> WristTorques {
        let mut torques = [0.0; WRIST_COUNT];
        for joint in WristJoint::ALL {
            let ch = joint.channel();
            if self.locked[ch] {
                torques[joint.wrist_index()] = joint_torque(
                    angles[ch],
                    self.target[ch],
                    velocities[ch],
                    self.gains.stiffness[ch],
                    self.gains.viscosity[ch],
                );
            }
        }
        torques
    }
}

impl Default for JointLockRegulator {
    fn default() -> Self {
        Self::new(RegulatorGains::default())
    }
}
