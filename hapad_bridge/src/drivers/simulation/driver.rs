//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `HapticDevice` trait with simulated
//! wrist dynamics, a scripted operator hand and a monotonic servo clock, for
//! development and testing without physical hardware.

use std::time::{Duration, Instant};

use hapad_common::consts::{WRIST_COUNT, WRIST_JOINTS};
use hapad_common::device::driver::{Channel, DeviceError, HapticDevice};
use hapad_common::device::types::{ActuationCommand, JointArray, Vec3, WristTorques};
use tracing::{debug, info};

use super::physics::{HandMotion, WristJointSim, wall_force};
use crate::command::{KeyConsumer, stdin_key_source};
use crate::config::SimulationConfig;

/// Simulation driver implementing the HapticDevice trait.
pub struct SimulationDriver {
    /// Driver settings
    config: SimulationConfig,
    /// Servo tick period
    period: Duration,
    /// Connection open
    opened: bool,
    /// Calibration done
    initialized: bool,
    /// Regulation thread running
    started: bool,
    /// Wrist joint simulators, in wrist order
    joints: [WristJointSim; WRIST_COUNT],
    /// Last commanded wrist torques
    torques: WristTorques,
    /// Operator hand path
    hand: HandMotion,
    /// Next servo tick boundary
    next_tick: Option<Instant>,
    /// Servo ticks since start
    ticks: u64,
    /// Key press source
    keys: Option<KeyConsumer>,
    /// Last error string
    last_error: String,
}

impl SimulationDriver {
    /// Create a closed simulation driver.
    pub fn new(config: &SimulationConfig) -> Self {
        let joint = WristJointSim::new(config.joint_inertia, config.joint_damping);
        Self {
            config: config.clone(),
            period: Duration::from_micros(config.servo_period_us),
            opened: false,
            initialized: false,
            started: false,
            joints: [joint.clone(), joint.clone(), joint],
            torques: [0.0; WRIST_COUNT],
            hand: HandMotion::new(config.hand_amplitude, config.hand_frequency_hz),
            next_tick: None,
            ticks: 0,
            keys: None,
            last_error: String::new(),
        }
    }

    /// Use `keys` as the key press source instead of stdin.
    pub fn with_key_source(mut self, keys: KeyConsumer) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Servo ticks elapsed since `start()`.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Mutable access to one wrist joint, for scripted operator input.
    pub fn wrist_joint_mut(&mut self, wrist_index: usize) -> Option<&mut WristJointSim> {
        self.joints.get_mut(wrist_index)
    }

    fn fail(&mut self, err: DeviceError) -> DeviceError {
        self.last_error = match &err {
            DeviceError::Read { reason, .. } => reason.clone(),
            DeviceError::Open(s)
            | DeviceError::Unsupported(s)
            | DeviceError::Init(s)
            | DeviceError::Start(s)
            | DeviceError::Homing(s)
            | DeviceError::Command(s) => s.clone(),
        };
        err
    }

    fn check_read(&mut self, channel: Channel) -> Result<(), DeviceError> {
        let reason = if !self.opened {
            Some("device not open".to_string())
        } else if self
            .config
            .fail_reads_after_ticks
            .is_some_and(|n| self.ticks > n)
        {
            Some(format!("injected read failure at tick {}", self.ticks))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(self.fail(DeviceError::Read { channel, reason })),
            None => Ok(()),
        }
    }

    fn sim_time(&self) -> Duration {
        self.period.saturating_mul(u32::try_from(self.ticks).unwrap_or(u32::MAX))
    }

    fn wrist_channels(&self, value: impl Fn(&WristJointSim) -> f64) -> JointArray {
        let mut out = [0.0; hapad_common::consts::DOF];
        for (slot, joint) in out[WRIST_JOINTS].iter_mut().zip(&self.joints) {
            *slot = value(joint);
        }
        out
    }

    fn step_physics(&mut self) {
        for (joint, &torque) in self.joints.iter_mut().zip(&self.torques) {
            joint.step(torque, self.period);
        }
        self.ticks += 1;
    }
}

impl HapticDevice for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        if self.opened {
            return Ok(());
        }
        if self.keys.is_none() && self.config.stdin_keys {
            self.keys = stdin_key_source();
        }
        self.opened = true;
        info!(
            "Simulation device opened (servo period {}us)",
            self.period.as_micros()
        );
        Ok(())
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn auto_init(&mut self) -> Result<(), DeviceError> {
        if !self.opened {
            return Err(self.fail(DeviceError::Init("device not open".to_string())));
        }
        debug!("Simulated calibration complete");
        self.initialized = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        if !self.initialized {
            return Err(self.fail(DeviceError::Start("device not calibrated".to_string())));
        }
        self.started = true;
        self.next_tick = Some(Instant::now() + self.period);
        Ok(())
    }

    fn move_to(&mut self, position: &JointArray) -> Result<(), DeviceError> {
        if !self.started {
            return Err(self.fail(DeviceError::Homing("regulation not running".to_string())));
        }
        for (joint, &angle) in self.joints.iter_mut().zip(&position[WRIST_JOINTS]) {
            joint.set_angle(angle);
        }
        Ok(())
    }

    fn has_tick_source(&self) -> bool {
        true
    }

    fn wait_for_tick(&mut self) {
        if !self.started {
            return;
        }
        let now = Instant::now();
        let boundary = self.next_tick.unwrap_or(now);
        if boundary > now {
            std::thread::sleep(boundary - now);
            self.next_tick = Some(boundary + self.period);
        } else {
            // Behind schedule: resynchronize rather than burst.
            self.next_tick = Some(now + self.period);
        }
        self.step_physics();
    }

    fn force(&mut self) -> Result<Vec3, DeviceError> {
        self.check_read(Channel::Force)?;
        Ok(wall_force(&self.hand.position(self.sim_time())))
    }

    fn position(&mut self) -> Result<Vec3, DeviceError> {
        self.check_read(Channel::Position)?;
        Ok(self.hand.position(self.sim_time()))
    }

    fn joint_angles(&mut self) -> Result<JointArray, DeviceError> {
        if !self.opened {
            return Err(self.fail(DeviceError::Read {
                channel: Channel::JointAngles,
                reason: "device not open".to_string(),
            }));
        }
        Ok(self.wrist_channels(WristJointSim::angle))
    }

    fn joint_velocities(&mut self) -> Result<JointArray, DeviceError> {
        if !self.opened {
            return Err(self.fail(DeviceError::Read {
                channel: Channel::JointVelocities,
                reason: "device not open".to_string(),
            }));
        }
        Ok(self.wrist_channels(WristJointSim::velocity))
    }

    fn command(&mut self, command: &ActuationCommand) -> Result<(), DeviceError> {
        if !self.started {
            return Err(self.fail(DeviceError::Command("regulation not running".to_string())));
        }
        if self
            .config
            .fail_commands_after_ticks
            .is_some_and(|n| self.ticks > n)
        {
            let reason = format!("injected command failure at tick {}", self.ticks);
            return Err(self.fail(DeviceError::Command(reason)));
        }
        self.torques = command.wrist_torques;
        Ok(())
    }

    fn poll_key(&mut self) -> Option<char> {
        self.keys.as_mut().and_then(KeyConsumer::pop)
    }

    fn last_error(&self) -> String {
        self.last_error.clone()
    }

    fn close(&mut self) {
        if !self.opened {
            return;
        }
        self.torques = [0.0; WRIST_COUNT];
        self.started = false;
        self.opened = false;
        self.next_tick = None;
        info!("Simulation device closed after {} ticks", self.ticks);
    }
}
