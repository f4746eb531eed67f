//! Gamepad sink trait and error types.

use crate::gamepad::report::GamepadReport;
use thiserror::Error;

/// Error types for virtual gamepad sink operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The bus client could not be allocated.
    #[error("failed to allocate sink client")]
    Alloc,

    /// Connecting the client to the bus driver failed.
    #[error("failed to connect to virtual bus: error {0:#x}")]
    Connect(u32),

    /// The gamepad target could not be added to the bus.
    #[error("failed to add virtual controller: error {0:#x}")]
    Attach(u32),

    /// The target rejected a report.
    #[error("failed to update virtual controller: error {0:#x}")]
    Update(u32),
}

/// Trait defining the interface of a virtual gamepad sink.
///
/// # Lifecycle
///
/// 1. `alloc_client()` → `connect()` → `alloc_target()` → `add_target()`
/// 2. `update()` - every tick
/// 3. `remove_target()` → `free_target()` → `free_client()`
///
/// The release calls are infallible; the session guarantees each is issued
/// at most once and in that order.
pub trait GamepadSink: Send {
    /// Returns the driver's unique identifier (e.g., "log").
    fn name(&self) -> &'static str;

    /// Allocate a bus client handle.
    fn alloc_client(&mut self) -> Result<(), SinkError>;

    /// Connect the client to the bus driver.
    fn connect(&mut self) -> Result<(), SinkError>;

    /// Allocate a gamepad-class target.
    fn alloc_target(&mut self);

    /// Register the target on the bus.
    fn add_target(&mut self) -> Result<(), SinkError>;

    /// Deliver one report to the target.
    fn update(&mut self, report: &GamepadReport) -> Result<(), SinkError>;

    /// Detach the target from the bus.
    fn remove_target(&mut self);

    /// Free the target.
    fn free_target(&mut self);

    /// Free the client.
    fn free_client(&mut self);
}
