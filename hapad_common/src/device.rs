//! Haptic device source contract.
//!
//! The bridge never talks to a vendor SDK directly; it drives an
//! implementation of [`driver::HapticDevice`] and consumes the sample types
//! in [`types`].

pub mod driver;
pub mod types;
