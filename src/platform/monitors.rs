//! Primary screen metrics
//!
//! The widget only ever needs the primary monitor: the full screen size for
//! the centering computation and the work area (excluding the taskbar) for
//! drag clamping.

use crate::domain::core::Rect;
use windows::Win32::Foundation::RECT;
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SystemParametersInfoW, SM_CXSCREEN, SM_CYSCREEN, SPI_GETWORKAREA,
    SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
};

/// Error types for screen metric queries
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("primary screen reports a non-positive size")]
    NoScreen,

    #[error("failed to query the work area")]
    WorkAreaFailed,
}

/// Primary monitor geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenMetrics {
    /// Full primary screen rectangle
    pub screen: Rect,
    /// Screen rectangle minus the taskbar
    pub work_area: Rect,
}

/// Queries the primary monitor.
pub fn primary_metrics() -> Result<ScreenMetrics, MonitorError> {
    let width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
    let height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
    if width <= 0 || height <= 0 {
        return Err(MonitorError::NoScreen);
    }

    let mut work_rect = RECT::default();
    let result = unsafe {
        SystemParametersInfoW(
            SPI_GETWORKAREA,
            0,
            Some(&mut work_rect as *mut _ as *mut _),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
    };
    if result.is_err() {
        return Err(MonitorError::WorkAreaFailed);
    }

    Ok(ScreenMetrics {
        screen: Rect::new(0, 0, width, height),
        work_area: Rect::new(
            work_rect.left,
            work_rect.top,
            work_rect.right - work_rect.left,
            work_rect.bottom - work_rect.top,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_metrics_reports_consistent_areas() {
        // Headless sessions may legitimately have no screen; the query must
        // fail cleanly rather than return nonsense.
        match primary_metrics() {
            Ok(metrics) => {
                assert!(metrics.screen.w > 0);
                assert!(metrics.screen.h > 0);
                assert!(metrics.work_area.w <= metrics.screen.w);
                assert!(metrics.work_area.h <= metrics.screen.h);
            }
            Err(e) => {
                log::debug!("no primary screen in test environment: {e}");
            }
        }
    }
}
