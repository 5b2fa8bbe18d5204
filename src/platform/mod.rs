//! Platform-specific Windows implementations
//!
//! This module encapsulates the Win32 API interactions that are not tied
//! to the widget window itself and provides a clean interface to the rest
//! of the application.

pub mod monitors;

pub use monitors::{primary_metrics, MonitorError, ScreenMetrics};
