//! Bridge configuration: TOML schema, defaults and validation.
//!
//! Every section is optional. Without a file the bridge runs the rotation
//! variant on the simulation device with the log sink.

use std::path::Path;

use hapad_common::config::{ConfigError, ConfigLoader, SharedConfig};
use hapad_common::consts::{
    DEFAULT_SERVO_PERIOD_US, DEFAULT_STIFFNESS, DEFAULT_TICK_SLEEP_US, DEFAULT_VISCOSITY,
    WRIST_JOINTS,
};
use hapad_common::device::types::JointArray;
use serde::Deserialize;

use crate::mapping::DEFAULT_DIVISOR;
use crate::regulator::RegulatorGains;

/// Which per-tick pipeline the loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Tick wait, acquisition, joint-lock regulation, mapping, publish.
    #[default]
    Rotation,
    /// Tick wait, force/position acquisition, mapping, publish.
    Passthrough,
    /// Synthetic sweep pattern from the `sweep` device; sleep-paced.
    Sweep,
}

impl Variant {
    /// Whether this variant reads joints and commands wrist torques.
    pub const fn regulates(self) -> bool {
        matches!(self, Self::Rotation)
    }
}

/// `[bridge]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    /// Per-tick pipeline.
    pub variant: Variant,
    /// Registered device driver name.
    pub device: String,
    /// Registered sink driver name.
    pub sink: String,
    /// Fixed pacing sleep after each tick [µs]; 0 disables it.
    pub tick_sleep_us: u64,
    /// Cycle duration above which a tick counts as an overrun [µs].
    pub cycle_budget_us: u64,
    /// Cycles between debug statistic lines.
    pub stats_interval: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            device: "simulation".to_string(),
            sink: "log".to_string(),
            tick_sleep_us: DEFAULT_TICK_SLEEP_US,
            cycle_budget_us: 2 * DEFAULT_TICK_SLEEP_US + DEFAULT_SERVO_PERIOD_US,
            stats_interval: 1000,
        }
    }
}

/// `[mapping]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// Scaling divisor D.
    pub divisor: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_DIVISOR,
        }
    }
}

/// `[regulator]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegulatorConfig {
    /// Stiffness per channel [Nm/rad].
    pub stiffness: JointArray,
    /// Viscosity per channel [Nm·s/rad].
    pub viscosity: JointArray,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            stiffness: DEFAULT_STIFFNESS,
            viscosity: DEFAULT_VISCOSITY,
        }
    }
}

impl RegulatorConfig {
    /// Gains for the regulator.
    pub const fn gains(&self) -> RegulatorGains {
        RegulatorGains {
            stiffness: self.stiffness,
            viscosity: self.viscosity,
        }
    }
}

/// `[simulation]` section, read by the built-in development drivers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Simulated servo tick period [µs].
    pub servo_period_us: u64,
    /// Wrist joint inertia [kg·m²].
    pub joint_inertia: f64,
    /// Intrinsic wrist joint damping [Nm·s/rad].
    pub joint_damping: f64,
    /// Simulated operator motion amplitude [m].
    pub hand_amplitude: f64,
    /// Simulated operator motion frequency [Hz].
    pub hand_frequency_hz: f64,
    /// Forward stdin characters as key presses.
    pub stdin_keys: bool,
    /// Fail force/position reads after this many ticks.
    pub fail_reads_after_ticks: Option<u64>,
    /// Reject actuation commands after this many ticks.
    pub fail_commands_after_ticks: Option<u64>,
    /// Reject sink updates after this many successful updates.
    pub fail_updates_after: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            servo_period_us: DEFAULT_SERVO_PERIOD_US,
            joint_inertia: 0.002,
            joint_damping: 0.01,
            hand_amplitude: 0.04,
            hand_frequency_hz: 0.25,
            stdin_keys: true,
            fail_reads_after_ticks: None,
            fail_commands_after_ticks: None,
            fail_updates_after: None,
        }
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Common fields.
    pub shared: SharedConfig,
    /// Loop settings.
    pub bridge: LoopConfig,
    /// Report mapping.
    pub mapping: MappingConfig,
    /// Joint lock gains.
    pub regulator: RegulatorConfig,
    /// Development driver settings.
    pub simulation: SimulationConfig,
}

impl BridgeConfig {
    /// Validate all sections.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.bridge.device.is_empty() || self.bridge.sink.is_empty() {
            return Err(invalid("bridge.device and bridge.sink must be set"));
        }
        if self.bridge.stats_interval == 0 {
            return Err(invalid("bridge.stats_interval must be > 0"));
        }

        let d = self.mapping.divisor;
        if !d.is_finite() || d <= 0.0 {
            return Err(invalid(format!(
                "mapping.divisor must be finite and > 0 (got {d})"
            )));
        }

        validate_gains("regulator.stiffness", &self.regulator.stiffness)?;
        validate_gains("regulator.viscosity", &self.regulator.viscosity)?;

        let sim = &self.simulation;
        if sim.servo_period_us == 0 {
            return Err(invalid("simulation.servo_period_us must be > 0"));
        }
        if !(sim.joint_inertia.is_finite() && sim.joint_inertia > 0.0) {
            return Err(invalid("simulation.joint_inertia must be finite and > 0"));
        }
        if !(sim.joint_damping.is_finite() && sim.joint_damping >= 0.0) {
            return Err(invalid("simulation.joint_damping must be finite and >= 0"));
        }
        if !sim.hand_amplitude.is_finite() || !sim.hand_frequency_hz.is_finite() {
            return Err(invalid("simulation hand motion must be finite"));
        }
        Ok(())
    }
}

fn validate_gains(field: &str, gains: &JointArray) -> Result<(), ConfigError> {
    for (i, &g) in gains.iter().enumerate() {
        if !g.is_finite() || g < 0.0 {
            return Err(invalid(format!(
                "{field}[{i}] must be finite and >= 0 (got {g})"
            )));
        }
        if g != 0.0 && !WRIST_JOINTS.contains(&i) {
            return Err(invalid(format!(
                "{field}[{i}] must be 0: only channels {}..{} are lockable",
                WRIST_JOINTS.start, WRIST_JOINTS.end
            )));
        }
    }
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

/// Load and validate the configuration.
///
/// `None` yields the validated defaults.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    let config = match path {
        Some(p) => BridgeConfig::load(p)?,
        None => BridgeConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
