//! Application orchestration layer
//!
//! The signal state machine is pure and platform-free; the controller
//! wires it to the window shell and the global input listeners.

pub mod state;

#[cfg(windows)]
pub mod controller;

pub use state::{Signal, SignalEvent, SignalMachine};

#[cfg(windows)]
pub use controller::{AppController, AppError};
