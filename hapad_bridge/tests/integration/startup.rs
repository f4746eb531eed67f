//! Integration test: session startup and partial release.
//!
//! Validates the sink → device startup order and that every failure point
//! releases exactly what was acquired before it, in teardown order.

use hapad_bridge::error::InitError;
use hapad_bridge::session::Session;
use hapad_common::device::driver::DeviceError;
use hapad_common::gamepad::sink::SinkError;

use super::mocks::{DeviceScript, Event, EventLog, FULL_RELEASE, MockDevice, MockSink, SinkScript};

fn open(log: &EventLog, device: DeviceScript, sink: SinkScript) -> Result<Session, InitError> {
    Session::open(
        Box::new(MockDevice::new(log, device)),
        Box::new(MockSink::new(log, sink)),
    )
}

#[test]
fn startup_order_sink_then_device() {
    let log = EventLog::default();
    let session = open(&log, DeviceScript::default(), SinkScript::default()).unwrap();
    assert!(session.is_device_open());
    assert!(session.is_sink_attached());

    assert_eq!(
        log.events(),
        vec![
            Event::AllocClient,
            Event::Connect,
            Event::AllocTarget,
            Event::AddTarget,
            Event::DeviceOpen,
            Event::Start,
            Event::Home,
            Event::EncIGain,
        ]
    );
}

#[test]
fn uncalibrated_device_runs_auto_init() {
    let log = EventLog::default();
    let script = DeviceScript {
        needs_init: true,
        ..DeviceScript::default()
    };
    let _session = open(&log, script, SinkScript::default()).unwrap();
    let events = log.events();
    let init = events.iter().position(|e| *e == Event::AutoInit).unwrap();
    let start = events.iter().position(|e| *e == Event::Start).unwrap();
    assert!(init < start);
}

#[test]
fn client_alloc_failure_touches_nothing() {
    let log = EventLog::default();
    let sink = SinkScript {
        fail_alloc: true,
        ..SinkScript::default()
    };
    let err = open(&log, DeviceScript::default(), sink).err().unwrap();
    assert_eq!(err, InitError::Sink(SinkError::Alloc));
    assert!(log.events().is_empty());
}

#[test]
fn connect_failure_frees_client_only() {
    let log = EventLog::default();
    let sink = SinkScript {
        fail_connect: true,
        ..SinkScript::default()
    };
    let err = open(&log, DeviceScript::default(), sink).err().unwrap();
    assert!(matches!(err, InitError::Sink(SinkError::Connect(_))));
    assert_eq!(log.events(), vec![Event::AllocClient, Event::FreeClient]);
}

#[test]
fn attach_failure_frees_target_then_client() {
    let log = EventLog::default();
    let sink = SinkScript {
        fail_add: true,
        ..SinkScript::default()
    };
    let err = open(&log, DeviceScript::default(), sink).err().unwrap();
    assert!(matches!(err, InitError::Sink(SinkError::Attach(_))));
    assert_eq!(log.releases(), vec![Event::FreeTarget, Event::FreeClient]);
    assert_eq!(log.count(&Event::DeviceOpen), 0);
}

#[test]
fn device_open_failure_destroys_sink() {
    let log = EventLog::default();
    let device = DeviceScript {
        fail_open: true,
        ..DeviceScript::default()
    };
    let err = open(&log, device, SinkScript::default()).err().unwrap();
    assert!(matches!(err, InitError::Device(DeviceError::Open(_))));
    assert_eq!(
        log.releases(),
        vec![Event::RemoveTarget, Event::FreeTarget, Event::FreeClient]
    );
}

#[test]
fn unsupported_device_closes_and_releases_everything() {
    let log = EventLog::default();
    let device = DeviceScript {
        unsupported: true,
        ..DeviceScript::default()
    };
    let err = open(&log, device, SinkScript::default()).err().unwrap();
    assert_eq!(
        err,
        InitError::Device(DeviceError::Unsupported("mock error".to_string()))
    );
    assert_eq!(log.releases(), FULL_RELEASE);
}

#[test]
fn homing_failure_releases_everything_once() {
    let log = EventLog::default();
    let device = DeviceScript {
        fail_home: true,
        ..DeviceScript::default()
    };
    let err = open(&log, device, SinkScript::default()).err().unwrap();
    assert!(matches!(err, InitError::Device(DeviceError::Homing(_))));
    assert_eq!(log.releases(), FULL_RELEASE);
}

#[test]
fn teardown_is_idempotent_and_runs_on_drop() {
    let log = EventLog::default();
    let mut session = open(&log, DeviceScript::default(), SinkScript::default()).unwrap();
    session.teardown();
    session.teardown();
    assert!(!session.is_device_open());
    assert!(!session.is_sink_attached());
    drop(session);
    assert_eq!(log.releases(), FULL_RELEASE);
}

#[test]
fn drop_alone_releases_in_order() {
    let log = EventLog::default();
    let session = open(&log, DeviceScript::default(), SinkScript::default()).unwrap();
    drop(session);
    assert_eq!(log.releases(), FULL_RELEASE);
}
