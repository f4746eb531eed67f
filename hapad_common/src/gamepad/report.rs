//! Fixed-layout gamepad report.

/// One tick's worth of stick and trigger values.
///
/// Constructed fresh each tick, zero-initialized, populated, and consumed
/// exactly once by [`GamepadSink::update`](super::sink::GamepadSink::update).
/// Button fields are never driven by the bridge and stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(C)]
pub struct GamepadReport {
    /// Button bitmask (unused, always zero).
    pub buttons: u16,
    /// Left trigger [0, 255].
    pub left_trigger: u8,
    /// Right trigger [0, 255].
    pub right_trigger: u8,
    /// Left stick X [-32767, 32767].
    pub thumb_lx: i16,
    /// Left stick Y [-32767, 32767].
    pub thumb_ly: i16,
    /// Right stick X [-32767, 32767].
    pub thumb_rx: i16,
    /// Right stick Y [-32767, 32767].
    pub thumb_ry: i16,
}

impl GamepadReport {
    /// Whether every analog field is zero.
    pub const fn is_neutral(&self) -> bool {
        self.left_trigger == 0
            && self.right_trigger == 0
            && self.thumb_lx == 0
            && self.thumb_ly == 0
            && self.thumb_rx == 0
            && self.thumb_ry == 0
    }
}
