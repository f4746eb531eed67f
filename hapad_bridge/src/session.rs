//! Device session: ownership of the haptic device and the virtual sink.
//!
//! Startup order is sink first (client → connect → target → add), then the
//! device (open → supported → auto-init → start → home). Any failure releases
//! everything acquired so far.
//!
//! Teardown order, on every exit path and exactly once:
//! device close → target remove → target free → client free.

use hapad_common::consts::DOF;
use hapad_common::device::driver::{DeviceError, HapticDevice};
use hapad_common::gamepad::sink::GamepadSink;
use tracing::{info, warn};

use crate::error::InitError;

/// How far sink creation progressed; drives partial release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SinkStage {
    Released,
    ClientAllocated,
    Connected,
    TargetAllocated,
    Attached,
}

/// Open haptic device plus attached virtual gamepad.
pub struct Session {
    device: Box<dyn HapticDevice>,
    sink: Box<dyn GamepadSink>,
    device_open: bool,
    sink_stage: SinkStage,
}

impl Session {
    /// Create the sink, then open and home the device.
    ///
    /// # Errors
    /// Returns the first [`InitError`]; everything acquired before it has
    /// already been released when this returns.
    pub fn open(
        device: Box<dyn HapticDevice>,
        sink: Box<dyn GamepadSink>,
    ) -> Result<Self, InitError> {
        let mut session = Self {
            device,
            sink,
            device_open: false,
            sink_stage: SinkStage::Released,
        };

        if let Err(e) = session.create_sink() {
            session.destroy_sink();
            return Err(e);
        }
        if let Err(e) = session.open_device() {
            session.teardown();
            return Err(e);
        }
        Ok(session)
    }

    fn create_sink(&mut self) -> Result<(), InitError> {
        info!("Allocating virtual gamepad client ({})", self.sink.name());
        self.sink.alloc_client()?;
        self.sink_stage = SinkStage::ClientAllocated;

        self.sink.connect()?;
        self.sink_stage = SinkStage::Connected;

        self.sink.alloc_target();
        self.sink_stage = SinkStage::TargetAllocated;

        self.sink.add_target()?;
        self.sink_stage = SinkStage::Attached;

        info!("Virtual gamepad attached");
        Ok(())
    }

    fn open_device(&mut self) -> Result<(), InitError> {
        info!("Opening haptic device ({})", self.device.name());
        self.device.open()?;
        self.device_open = true;

        if !self.device.is_supported() {
            return Err(DeviceError::Unsupported(self.device.last_error()).into());
        }
        if !self.device.is_initialized() {
            info!("Device not calibrated, running auto-init");
            self.device.auto_init()?;
        }
        self.device.start()?;

        self.device.move_to(&[0.0; DOF])?;
        if let Err(e) = self.device.set_enc_i_gain(0.0) {
            warn!("Could not disable encoder integral gain: {e}");
        }

        info!("Haptic device ready at home position");
        Ok(())
    }

    /// Borrow the device and sink together.
    pub fn parts(&mut self) -> (&mut dyn HapticDevice, &mut dyn GamepadSink) {
        (self.device.as_mut(), self.sink.as_mut())
    }

    /// Whether the device is still open.
    pub const fn is_device_open(&self) -> bool {
        self.device_open
    }

    /// Whether the gamepad target is attached.
    pub fn is_sink_attached(&self) -> bool {
        self.sink_stage == SinkStage::Attached
    }

    /// Close the device. Idempotent.
    pub fn close_device(&mut self) {
        if self.device_open {
            self.device.close();
            self.device_open = false;
        }
    }

    /// Detach and free the target, then free the client. Idempotent and
    /// correct for partially created sinks.
    pub fn destroy_sink(&mut self) {
        let stage = self.sink_stage;
        if stage >= SinkStage::Attached {
            self.sink.remove_target();
        }
        if stage >= SinkStage::TargetAllocated {
            self.sink.free_target();
        }
        if stage >= SinkStage::ClientAllocated {
            self.sink.free_client();
        }
        self.sink_stage = SinkStage::Released;
    }

    /// Release everything in teardown order. Idempotent.
    pub fn teardown(&mut self) {
        self.close_device();
        self.destroy_sink();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
