//! Wrist joint dynamics and simulated operator motion.
//!
//! Each wrist joint is a rotating inertia with viscous friction:
//!
//! ```text
//! J · dω/dt = τ_cmd − b · ω
//! ```
//!
//! integrated with semi-implicit Euler (velocity first, then angle with the
//! new velocity). The operator's hand follows a Lissajous path and presses
//! against a virtual wall that pushes back proportionally to displacement.

use std::f64::consts::TAU;
use std::time::Duration;

use hapad_common::device::types::Vec3;
use tracing::trace;

/// Virtual wall stiffness [N/m].
pub const WALL_STIFFNESS: f64 = 200.0;

/// One simulated wrist joint.
#[derive(Debug, Clone, PartialEq)]
pub struct WristJointSim {
    inertia: f64,
    damping: f64,
    angle: f64,
    velocity: f64,
}

impl WristJointSim {
    /// Create a joint at rest at angle 0.
    pub const fn new(inertia: f64, damping: f64) -> Self {
        Self {
            inertia,
            damping,
            angle: 0.0,
            velocity: 0.0,
        }
    }

    /// Current angle [rad].
    #[inline]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    /// Current velocity [rad/s].
    #[inline]
    pub const fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Place the joint at `angle` with zero velocity.
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.velocity = 0.0;
    }

    /// Give the joint an initial velocity (operator twist).
    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    /// Advance by `dt` under the commanded torque.
    pub fn step(&mut self, torque: f64, dt: Duration) {
        let dt_s = dt.as_secs_f64();
        let accel = (torque - self.damping * self.velocity) / self.inertia;
        self.velocity += accel * dt_s;
        self.angle += self.velocity * dt_s;
        trace!(
            angle = self.angle,
            velocity = self.velocity,
            torque,
            "Wrist joint step"
        );
    }
}

/// Simulated operator hand on a Lissajous path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandMotion {
    amplitude: f64,
    frequency_hz: f64,
}

impl HandMotion {
    /// Create a hand motion of the given amplitude [m] and base frequency [Hz].
    pub const fn new(amplitude: f64, frequency_hz: f64) -> Self {
        Self {
            amplitude,
            frequency_hz,
        }
    }

    /// Hand position at time `t` since start.
    ///
    /// X runs at the base frequency, Y at 3/2 of it, Z is a slow
    /// half-wave that stays on the positive side.
    pub fn position(&self, t: Duration) -> Vec3 {
        let phase = TAU * self.frequency_hz * t.as_secs_f64();
        [
            self.amplitude * phase.sin(),
            self.amplitude * (1.5 * phase).cos(),
            self.amplitude * 0.5 * (1.0 - (0.5 * phase).cos()),
        ]
    }
}

/// Wall reaction force for a hand displaced by `position` from the origin.
#[inline]
pub fn wall_force(position: &Vec3) -> Vec3 {
    [
        -WALL_STIFFNESS * position[0],
        -WALL_STIFFNESS * position[1],
        WALL_STIFFNESS * position[2],
    ]
}
