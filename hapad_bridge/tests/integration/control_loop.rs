//! Integration test: control loop against recording collaborators.
//!
//! Covers regulation end-to-end, variant differences, cooperative stop and
//! the teardown guarantee on every loop exit path.

use hapad_bridge::config::{BridgeConfig, Variant};
use hapad_bridge::cycle::{CycleRunner, StopFlag};
use hapad_bridge::drivers::sweep::SweepDevice;
use hapad_bridge::error::{ActuationError, BridgeError};
use hapad_bridge::regulator::LockState;
use hapad_bridge::command::WristJoint;
use hapad_bridge::session::Session;
use hapad_common::device::driver::DeviceError;
use hapad_common::gamepad::sink::SinkError;

use super::mocks::{
    DeviceScript, Event, EventLog, FULL_RELEASE, MockDevice, MockSink, SinkScript, wrist,
};

fn config(variant: Variant) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.bridge.variant = variant;
    config.bridge.tick_sleep_us = 0;
    config
}

struct Harness {
    log: EventLog,
    stop: StopFlag,
    runner: CycleRunner,
    session: Session,
}

impl Harness {
    fn new(variant: Variant, device: DeviceScript, sink: SinkScript) -> Self {
        let log = EventLog::default();
        let stop = StopFlag::new();
        let session = Session::open(
            Box::new(MockDevice::new(&log, device)),
            Box::new(MockSink::new(&log, sink)),
        )
        .ok()
        .unwrap();
        let runner = CycleRunner::new(&config(variant), stop.clone());
        Self {
            log,
            stop,
            runner,
            session,
        }
    }

    fn run(&mut self) -> Result<(), BridgeError> {
        self.runner.run(&mut self.session)
    }
}

#[test]
fn quit_key_stops_after_current_tick() {
    let device = DeviceScript {
        keys: vec![(3, 'q')],
        ..DeviceScript::default()
    };
    let mut h = Harness::new(Variant::Rotation, device, SinkScript::default());
    h.run().unwrap();

    assert!(h.stop.is_set());
    assert_eq!(h.log.updates().len(), 3);
    assert_eq!(h.log.releases(), FULL_RELEASE);
    assert_eq!(h.runner.state().stats.cycle_count, 3);
}

#[test]
fn uppercase_quit_is_accepted() {
    let device = DeviceScript {
        keys: vec![(1, 'Q')],
        ..DeviceScript::default()
    };
    let mut h = Harness::new(Variant::Passthrough, device, SinkScript::default());
    h.run().unwrap();
    assert_eq!(h.log.updates().len(), 1);
}

#[test]
fn stop_during_tick_wait_completes_that_tick() {
    let stop = StopFlag::new();
    let device = DeviceScript {
        stop_at: Some((2, stop.clone())),
        ..DeviceScript::default()
    };
    let log = EventLog::default();
    let mut session = Session::open(
        Box::new(MockDevice::new(&log, device)),
        Box::new(MockSink::new(&log, SinkScript::default())),
    )
    .ok()
    .unwrap();
    let mut runner = CycleRunner::new(&config(Variant::Rotation), stop);

    runner.run(&mut session).unwrap();

    // Tick 2 was already underway: it still reads, commands and publishes.
    assert_eq!(log.updates().len(), 2);
    assert_eq!(log.commands().len(), 2);
    assert_eq!(log.count(&Event::Tick(3)), 0);
    assert_eq!(log.releases(), FULL_RELEASE);
}

#[test]
fn stop_before_run_still_tears_down() {
    let mut h = Harness::new(Variant::Rotation, DeviceScript::default(), SinkScript::default());
    h.stop.request();
    h.run().unwrap();
    assert!(h.log.updates().is_empty());
    assert_eq!(h.log.releases(), FULL_RELEASE);
}

#[test]
fn locked_joint_is_pulled_back_to_capture_angle() {
    let device = DeviceScript {
        angles: wrist(0.1, 0.2, 0.3),
        angle_changes: vec![(2, wrist(0.3, 0.2, 0.3))],
        keys: vec![(1, '0'), (3, 'q')],
        ..DeviceScript::default()
    };
    let mut h = Harness::new(Variant::Rotation, device, SinkScript::default());
    h.run().unwrap();

    let commands = h.log.commands();
    assert_eq!(commands.len(), 3);
    // Tick 1: key handled after the command, nothing locked yet.
    assert_eq!(commands[0], [0.0, 0.0, 0.0]);
    // Ticks 2 and 3: J0 locked at 0.1, now at 0.3.
    for torques in &commands[1..] {
        assert!((torques[0] - (-4.0 * 0.2)).abs() < 1e-9);
        assert_eq!(torques[1], 0.0);
        assert_eq!(torques[2], 0.0);
    }

    let regulator = &h.runner.state().regulator;
    assert_eq!(regulator.state(WristJoint::J0), LockState::Locked);
    assert_eq!(regulator.target(WristJoint::J0), Some(0.1));
}

#[test]
fn toggle_all_locks_every_wrist_joint() {
    let device = DeviceScript {
        angles: wrist(0.1, 0.2, 0.3),
        angle_changes: vec![(2, wrist(0.0, 0.0, 0.0))],
        keys: vec![(1, 'a'), (2, 'q')],
        ..DeviceScript::default()
    };
    let mut h = Harness::new(Variant::Rotation, device, SinkScript::default());
    h.run().unwrap();

    let last = h.log.commands()[1];
    assert!((last[0] - 4.0 * 0.1).abs() < 1e-9);
    assert!((last[1] - 3.0 * 0.2).abs() < 1e-9);
    assert!((last[2] - 1.0 * 0.3).abs() < 1e-9);
}

#[test]
fn passthrough_never_commands_and_ignores_toggles() {
    let device = DeviceScript {
        angles: wrist(0.1, 0.2, 0.3),
        keys: vec![(1, 'a'), (2, '0'), (3, 'q')],
        position: [8.0, 0.0, 0.0],
        force: [0.0, -8.0, 4.0],
        ..DeviceScript::default()
    };
    let mut h = Harness::new(Variant::Passthrough, device, SinkScript::default());
    h.run().unwrap();

    assert!(h.log.commands().is_empty());
    for joint in WristJoint::ALL {
        assert_eq!(h.runner.state().regulator.state(joint), LockState::Unlocked);
    }

    let updates = h.log.updates();
    assert_eq!(updates.len(), 3);
    let report = updates[0];
    assert_eq!(report.thumb_lx, 32767);
    assert_eq!(report.thumb_ly, 0);
    assert_eq!(report.thumb_ry, -32767);
    assert_eq!(report.right_trigger, 128);
    assert_eq!(report.buttons, 0);
}

#[test]
fn joint_read_failures_are_not_fatal() {
    let device = DeviceScript {
        fail_joints: true,
        keys: vec![(5, 'q')],
        ..DeviceScript::default()
    };
    let mut h = Harness::new(Variant::Rotation, device, SinkScript::default());
    h.run().unwrap();

    assert_eq!(h.log.updates().len(), 5);
    assert_eq!(h.runner.state().reader.joint_read_failures(), 5);
}

#[test]
fn sensor_read_failure_ends_loop_and_tears_down() {
    let device = DeviceScript {
        fail_force_at: Some(4),
        ..DeviceScript::default()
    };
    let mut h = Harness::new(Variant::Passthrough, device, SinkScript::default());
    let err = h.run().unwrap_err();

    assert!(matches!(err, BridgeError::SensorRead(DeviceError::Read { .. })));
    assert!(!err.is_init());
    assert_eq!(h.log.updates().len(), 3);
    assert_eq!(h.log.releases(), FULL_RELEASE);
}

#[test]
fn command_failure_sets_stop_and_tears_down() {
    let device = DeviceScript {
        fail_command_at: Some(2),
        ..DeviceScript::default()
    };
    let mut h = Harness::new(Variant::Rotation, device, SinkScript::default());
    let err = h.run().unwrap_err();

    assert!(matches!(
        err,
        BridgeError::Actuation(ActuationError::Device(DeviceError::Command(_)))
    ));
    assert!(h.stop.is_set());
    // The failing tick publishes nothing.
    assert_eq!(h.log.updates().len(), 1);
    assert_eq!(h.log.releases(), FULL_RELEASE);
}

#[test]
fn sink_update_failure_tears_down_in_order() {
    for fail_at in [1, 2, 7] {
        let sink = SinkScript {
            fail_update_at: Some(fail_at),
            ..SinkScript::default()
        };
        let mut h = Harness::new(Variant::Rotation, DeviceScript::default(), sink);
        let err = h.run().unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Actuation(ActuationError::Sink(SinkError::Update(0xE000_0301)))
        ));
        assert_eq!(h.log.updates().len() as u64, fail_at - 1);
        assert_eq!(h.log.releases(), FULL_RELEASE);

        // Dropping the session afterwards must not release twice.
        let Harness { log, session, .. } = h;
        drop(session);
        assert_eq!(log.releases(), FULL_RELEASE);
    }
}

#[test]
fn sweep_device_drives_reports_without_regulation() {
    let log = EventLog::default();
    let mut cfg = config(Variant::Sweep);
    cfg.mapping.divisor = 2.0;
    let sink = SinkScript {
        fail_update_at: Some(31),
        ..SinkScript::default()
    };
    let mut session = Session::open(
        Box::new(SweepDevice::new(&cfg)),
        Box::new(MockSink::new(&log, sink)),
    )
    .ok()
    .unwrap();
    let mut runner = CycleRunner::new(&cfg, StopFlag::new());
    assert!(runner.run(&mut session).is_err());

    let updates = log.updates();
    assert_eq!(updates.len(), 30);
    for (i, report) in updates.iter().enumerate() {
        let tick = i as i32 + 1;
        assert_eq!(i32::from(report.thumb_lx), tick * 1000);
        assert_eq!(i32::from(report.thumb_ry), tick * 1000);
        assert_eq!(i32::from(report.left_trigger), tick * 5);
    }
    // Sweep device has no recorded calls, only the sink releases.
    assert_eq!(
        log.releases(),
        vec![Event::RemoveTarget, Event::FreeTarget, Event::FreeClient]
    );
}
