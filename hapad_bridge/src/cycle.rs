//! Fixed-period control loop: read → regulate → command → map → publish.
//!
//! ## RT Setup
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` - lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` - pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO)` - RT priority.
//!
//! All four steps are no-ops without the `rt` feature.
//!
//! ## Cycle Loop
//! The loop blocks on the device's servo tick, runs one tick body, then
//! sleeps a fixed interval. Devices without a tick source are paced by the
//! sleep alone. Cancellation is cooperative: the stop flag is checked once
//! per iteration, so a tick that has started always runs to completion.
//!
//! ## Exit
//! Any sensor, actuation or sink failure ends the loop. Whatever the exit
//! path, the session is torn down before [`CycleRunner::run`] returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use hapad_common::device::types::ActuationCommand;
use tracing::{debug, error, info, trace, warn};

use crate::acquisition::SampleReader;
use crate::command::KeyCommand;
use crate::config::{BridgeConfig, Variant};
use crate::error::{ActuationError, BridgeError};
use crate::mapping::ReportMapper;
use crate::regulator::JointLockRegulator;
use crate::session::Session;

// ─── Stop Flag ──────────────────────────────────────────────────────

/// Process-wide stop request, safe to set from a signal handler.
///
/// Starts cleared; once set it is never cleared again.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request loop termination. Never blocks.
    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether termination was requested.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of cycles over budget.
    pub overruns: u64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    /// Record a cycle duration. Returns `true` if it exceeded `budget_ns`.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, budget_ns: i64) -> bool {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        let overrun = budget_ns > 0 && duration_ns > budget_ns;
        if overrun {
            self.overruns += 1;
        }
        overrun
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Loop State ─────────────────────────────────────────────────────

/// Everything the loop mutates across ticks.
#[derive(Debug, Clone)]
pub struct LoopState {
    /// Shared with the signal handler.
    pub stop: StopFlag,
    /// Wrist lock set and targets.
    pub regulator: JointLockRegulator,
    /// Latest device sample.
    pub reader: SampleReader,
    /// Timing statistics.
    pub stats: CycleStats,
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), BridgeError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| BridgeError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), BridgeError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop never faults it in.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, exclusive reference.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to a CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), BridgeError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| BridgeError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| BridgeError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), BridgeError> {
    Ok(())
}

/// Switch to SCHED_FIFO with the given priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), BridgeError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param for the duration of the call.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(BridgeError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), BridgeError> {
    Ok(())
}

/// Perform the RT setup sequence. Call before [`CycleRunner::run`].
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), BridgeError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

/// Whether the current thread already runs under an RT scheduling policy.
pub fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        // SAFETY: sched_getscheduler(0) only queries the calling thread.
        let policy = unsafe { libc::sched_getscheduler(0) };
        policy == libc::SCHED_FIFO || policy == libc::SCHED_RR
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// What bounds the loop rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Device servo tick, plus the fixed sleep when non-zero.
    DeviceTick,
    /// Fixed sleep only.
    Sleep,
    /// Neither: the loop spins as fast as the collaborators return.
    Unpaced,
}

impl Pacing {
    /// Pacing for a device with or without a tick source and the given sleep.
    pub fn of(has_tick_source: bool, tick_sleep: Duration) -> Self {
        if has_tick_source {
            Self::DeviceTick
        } else if tick_sleep.is_zero() {
            Self::Unpaced
        } else {
            Self::Sleep
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceTick => "device tick",
            Self::Sleep => "sleep",
            Self::Unpaced => "nothing",
        }
    }
}

/// Owns the loop state and runs ticks against a [`Session`].
pub struct CycleRunner {
    variant: Variant,
    mapper: ReportMapper,
    tick_sleep: Duration,
    budget_ns: i64,
    stats_interval: u64,
    pacing: Option<Pacing>,
    state: LoopState,
}

impl CycleRunner {
    /// Create a runner from a validated configuration.
    pub fn new(config: &BridgeConfig, stop: StopFlag) -> Self {
        Self {
            variant: config.bridge.variant,
            mapper: ReportMapper::new(config.mapping.divisor),
            tick_sleep: Duration::from_micros(config.bridge.tick_sleep_us),
            budget_ns: i64::try_from(config.bridge.cycle_budget_us.saturating_mul(1000))
                .unwrap_or(i64::MAX),
            stats_interval: config.bridge.stats_interval.max(1),
            pacing: None,
            state: LoopState {
                stop,
                regulator: JointLockRegulator::new(config.regulator.gains()),
                reader: SampleReader::new(),
                stats: CycleStats::new(),
            },
        }
    }

    /// Loop state (stop flag, lock set, latest sample, statistics).
    pub const fn state(&self) -> &LoopState {
        &self.state
    }

    /// How the last [`run`](Self::run) was paced. `None` before the first run.
    pub const fn pacing(&self) -> Option<Pacing> {
        self.pacing
    }

    /// Run until stopped or a fatal error, then tear the session down.
    ///
    /// # Errors
    /// The error that ended the loop. Teardown has completed either way.
    pub fn run(&mut self, session: &mut Session) -> Result<(), BridgeError> {
        let pacing = Pacing::of(session.parts().0.has_tick_source(), self.tick_sleep);
        if pacing == Pacing::Unpaced {
            warn!("Device has no tick source and tick sleep is 0: loop runs unpaced");
        }
        info!(
            "Starting {:?} loop (tick sleep {}us, paced by {}, {} mode)",
            self.variant,
            self.tick_sleep.as_micros(),
            pacing.as_str(),
            if detect_rt_mode() { "real-time" } else { "standard" }
        );
        self.pacing = Some(pacing);

        let result = self.run_loop(session);
        if let Err(e) = &result {
            error!("Loop aborted: {e}");
        }

        let stats = &self.state.stats;
        info!(
            "Stopping and cleaning up after {} cycles (avg={}us, max={}us, overruns={})",
            stats.cycle_count,
            stats.avg_cycle_ns() / 1000,
            stats.max_cycle_ns / 1000,
            stats.overruns
        );
        session.teardown();
        result
    }

    fn run_loop(&mut self, session: &mut Session) -> Result<(), BridgeError> {
        while !self.state.stop.is_set() {
            let cycle_start = Instant::now();

            self.tick(session)?;

            let duration_ns = i64::try_from(cycle_start.elapsed().as_nanos()).unwrap_or(i64::MAX);
            let stats = &mut self.state.stats;
            if stats.record(duration_ns, self.budget_ns)
                && (stats.overruns <= 10 || stats.overruns % 1000 == 0)
            {
                warn!(
                    "Timing violation #{}: cycle took {}us (budget {}us)",
                    stats.overruns,
                    duration_ns / 1000,
                    self.budget_ns / 1000
                );
            }
            if stats.cycle_count % self.stats_interval == 0 {
                debug!(
                    "Loop: {} cycles, avg={}us, min={}us, max={}us, overruns={}",
                    stats.cycle_count,
                    stats.avg_cycle_ns() / 1000,
                    stats.min_cycle_ns / 1000,
                    stats.max_cycle_ns / 1000,
                    stats.overruns
                );
            }

            if !self.tick_sleep.is_zero() {
                std::thread::sleep(self.tick_sleep);
            }
        }
        Ok(())
    }

    /// Run one tick body against the session.
    ///
    /// # Errors
    /// - [`BridgeError::SensorRead`] if force or position cannot be read
    /// - [`BridgeError::Actuation`] if the torque command or the sink update fails
    pub fn tick(&mut self, session: &mut Session) -> Result<(), BridgeError> {
        let (device, sink) = session.parts();
        let LoopState {
            stop,
            regulator,
            reader,
            ..
        } = &mut self.state;

        device.wait_for_tick();

        // ═══ READ ═══
        if self.variant.regulates() {
            reader.read_joints(device);
        }
        reader
            .read_cartesian(device)
            .map_err(BridgeError::SensorRead)?;

        // ═══ REGULATE + COMMAND ═══
        if self.variant.regulates() {
            let sample = reader.sample();
            let torques = regulator.wrist_torques(&sample.joint_angles, &sample.joint_velocities);
            if let Err(e) = device.command(&ActuationCommand::wrist_only(torques)) {
                error!("cannot set force ({})", device.last_error());
                stop.request();
                return Err(ActuationError::Device(e).into());
            }
        }

        // ═══ KEYS ═══
        if let Some(command) = device.poll_key().and_then(KeyCommand::from_key) {
            match command {
                KeyCommand::Quit => {
                    info!("Quit requested");
                    stop.request();
                }
                _ if self.variant.regulates() => {
                    regulator.apply(command, &reader.sample().joint_angles);
                }
                _ => debug!("Ignoring {command:?} in {:?} mode", self.variant),
            }
        }

        // ═══ MAP + PUBLISH ═══
        let sample = reader.sample();
        let report = self.mapper.map(sample.position, sample.force);
        trace!(?report, "Publishing report");
        sink.update(&report).map_err(ActuationError::Sink)?;

        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
