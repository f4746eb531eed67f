//! Log sink: in-process virtual gamepad for hosts without a bus driver.
//!
//! Enforces the bus lifecycle the same way a real bus does (no update before
//! the target is attached), counts updates and traces every report.

use hapad_common::gamepad::report::GamepadReport;
use hapad_common::gamepad::sink::{GamepadSink, SinkError};
use tracing::{debug, info, trace};

use crate::config::BridgeConfig;

/// Updates between debug summaries.
const SUMMARY_INTERVAL: u64 = 1000;

/// Bus error code reported for lifecycle violations.
pub const ERROR_NOT_ATTACHED: u32 = 0xE000_0302;

/// Bus error code reported for injected update failures.
pub const ERROR_INJECTED: u32 = 0xE000_0301;

/// Logging gamepad sink.
#[derive(Debug, Default)]
pub struct LogSink {
    client: bool,
    connected: bool,
    target: bool,
    attached: bool,
    updates: u64,
    last_report: GamepadReport,
    fail_updates_after: Option<u64>,
}

impl LogSink {
    /// Create a sink; `fail_updates_after` rejects updates past that count.
    pub fn new(fail_updates_after: Option<u64>) -> Self {
        Self {
            fail_updates_after,
            ..Self::default()
        }
    }

    /// Number of accepted updates.
    pub const fn updates(&self) -> u64 {
        self.updates
    }

    /// Last accepted report.
    pub const fn last_report(&self) -> &GamepadReport {
        &self.last_report
    }

    /// Whether the target is attached.
    pub const fn is_attached(&self) -> bool {
        self.attached
    }
}

impl GamepadSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn alloc_client(&mut self) -> Result<(), SinkError> {
        self.client = true;
        Ok(())
    }

    fn connect(&mut self) -> Result<(), SinkError> {
        if !self.client {
            return Err(SinkError::Connect(ERROR_NOT_ATTACHED));
        }
        self.connected = true;
        Ok(())
    }

    fn alloc_target(&mut self) {
        self.target = true;
    }

    fn add_target(&mut self) -> Result<(), SinkError> {
        if !(self.connected && self.target) {
            return Err(SinkError::Attach(ERROR_NOT_ATTACHED));
        }
        self.attached = true;
        info!("Log gamepad attached");
        Ok(())
    }

    fn update(&mut self, report: &GamepadReport) -> Result<(), SinkError> {
        if !self.attached {
            return Err(SinkError::Update(ERROR_NOT_ATTACHED));
        }
        if self.fail_updates_after.is_some_and(|n| self.updates >= n) {
            return Err(SinkError::Update(ERROR_INJECTED));
        }
        self.updates += 1;
        self.last_report = *report;
        trace!(?report, "Gamepad report");
        if self.updates % SUMMARY_INTERVAL == 0 {
            debug!(
                "Log sink: {} updates, last LX={} LY={} RX={} RY={} LT={} RT={}",
                self.updates,
                report.thumb_lx,
                report.thumb_ly,
                report.thumb_rx,
                report.thumb_ry,
                report.left_trigger,
                report.right_trigger
            );
        }
        Ok(())
    }

    fn remove_target(&mut self) {
        self.attached = false;
    }

    fn free_target(&mut self) {
        self.target = false;
    }

    fn free_client(&mut self) {
        if self.client {
            info!("Log gamepad released after {} updates", self.updates);
        }
        self.connected = false;
        self.client = false;
    }
}

/// Factory function to create a log sink instance.
pub fn create_driver(config: &BridgeConfig) -> Box<dyn GamepadSink> {
    Box::new(LogSink::new(config.simulation.fail_updates_after))
}
