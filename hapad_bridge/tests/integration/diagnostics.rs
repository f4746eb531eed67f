//! Integration test: log output of a failing run.
//!
//! Captures the formatted tracing output of a whole session and checks that
//! the error ending the loop is reported before any resource is released.

use std::io;
use std::sync::{Arc, Mutex};

use hapad_bridge::config::{BridgeConfig, Variant};
use hapad_bridge::cycle::{CycleRunner, Pacing, StopFlag};
use hapad_bridge::drivers::log_sink::LogSink;
use hapad_bridge::drivers::sweep::SweepDevice;
use hapad_bridge::error::{ActuationError, BridgeError};
use hapad_bridge::session::Session;
use hapad_common::gamepad::sink::SinkError;

use super::mocks::{DeviceScript, EventLog, FULL_RELEASE, MockDevice, MockSink, SinkScript};

/// Shared buffer the subscriber writes into.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every event at INFO and above written to the returned buffer.
fn capture<T>(f: impl FnOnce() -> T) -> (T, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer)
}

fn line_of(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("no log line containing {needle:?} in {lines:#?}"))
}

#[test]
fn sink_failure_is_logged_before_teardown() {
    let mut cfg = BridgeConfig::default();
    cfg.bridge.variant = Variant::Sweep;
    cfg.bridge.tick_sleep_us = 0;

    let (result, buffer) = capture(|| {
        let mut session = Session::open(
            Box::new(SweepDevice::new(&cfg)),
            Box::new(LogSink::new(Some(3))),
        )
        .ok()
        .unwrap();
        let mut runner = CycleRunner::new(&cfg, StopFlag::new());
        let result = runner.run(&mut session);
        assert_eq!(runner.pacing(), Some(Pacing::Unpaced));
        result
    });

    assert!(matches!(
        result,
        Err(BridgeError::Actuation(ActuationError::Sink(SinkError::Update(_))))
    ));

    let lines = buffer.lines();
    let failure = lines
        .iter()
        .position(|l| l.contains("ERROR"))
        .unwrap_or_else(|| panic!("no ERROR line in {lines:#?}"));
    assert!(
        lines[failure].contains("failed to update virtual controller"),
        "{}",
        lines[failure]
    );
    assert!(failure < line_of(&lines, "Sweep device closed"));
    assert!(failure < line_of(&lines, "Log gamepad released"));

    // No tick source and no sleep: the run announces it spins freely.
    assert!(line_of(&lines, "paced by nothing") < failure);
    assert!(line_of(&lines, "loop runs unpaced") < failure);
}

#[test]
fn clean_stop_logs_no_error() {
    let log = EventLog::default();
    let device = DeviceScript {
        keys: vec![(2, 'q')],
        ..DeviceScript::default()
    };
    let mut cfg = BridgeConfig::default();
    cfg.bridge.tick_sleep_us = 0;

    let (result, buffer) = capture(|| {
        let mut session = Session::open(
            Box::new(MockDevice::new(&log, device)),
            Box::new(MockSink::new(&log, SinkScript::default())),
        )
        .ok()
        .unwrap();
        let mut runner = CycleRunner::new(&cfg, StopFlag::new());
        let result = runner.run(&mut session);
        assert_eq!(runner.pacing(), Some(Pacing::DeviceTick));
        result
    });

    assert!(result.is_ok());
    assert_eq!(log.releases(), FULL_RELEASE);
    let lines = buffer.lines();
    assert!(lines.iter().all(|l| !l.contains("ERROR")), "{lines:#?}");
    line_of(&lines, "paced by device tick");
}
