//! Application controller and coordination layer
//!
//! The controller wires the window shell to the global input listeners and
//! pumps the main-thread message loop. Each listener is held through an
//! RAII handle so teardown order never leaks a hook or a hotkey
//! registration.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::input::{HotkeyError, HotkeyManager, KeyTap, KeyTapError, PointerWatcher, SystemPointer, VirtualKey};
use crate::platform::{self, MonitorError};
use crate::ui::{WidgetWindow, WindowError, MSG_KEY, MSG_POINTER, MSG_RESET, MSG_START};

use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, PostMessageW, TranslateMessage, MSG,
};

/// Application errors that can occur during controller operations
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Hotkey(#[from] HotkeyError),

    #[error(transparent)]
    KeyTap(#[from] KeyTapError),
}

/// RAII wrapper keeping the start/reset hotkeys registered
///
/// The manager thread outlives the registrations; dropping the guard
/// unregisters both keys before the thread is stopped by the manager's own
/// Drop.
struct HotkeyGuard {
    manager: HotkeyManager,
    ids: Vec<u32>,
}

impl HotkeyGuard {
    fn new(target: HWND) -> Result<Self, HotkeyError> {
        let mut manager = HotkeyManager::new();
        manager.start()?;

        let mut ids = Vec::new();
        for (key, message) in [(VirtualKey::F5, MSG_START), (VirtualKey::F6, MSG_RESET)] {
            let id = manager.register_hotkey(
                &[],
                key,
                Arc::new(move || unsafe {
                    let _ = PostMessageW(target, message, WPARAM(0), LPARAM(0));
                }),
            )?;
            ids.push(id);
        }

        Ok(Self { manager, ids })
    }
}

impl Drop for HotkeyGuard {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            let _ = self.manager.unregister_hotkey(id);
        }
    }
}

/// Main application controller
pub struct AppController {
    window: WidgetWindow,
    _hotkeys: HotkeyGuard,
    _key_tap: KeyTap,
    _pointer: PointerWatcher,
}

impl AppController {
    /// Builds the window and starts every listener.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let metrics = platform::primary_metrics()?;
        log::debug!(
            "primary screen {}x{}, work area {}x{}",
            metrics.screen.w,
            metrics.screen.h,
            metrics.work_area.w,
            metrics.work_area.h
        );

        let poll = Duration::from_millis(config.pointer_poll_ms);
        let window = WidgetWindow::create(config, metrics)?;
        let hwnd = window.hwnd();

        let hotkeys = HotkeyGuard::new(hwnd)?;
        let key_tap = KeyTap::install(hwnd, MSG_KEY)?;

        let pointer = PointerWatcher::spawn(SystemPointer, poll, move |x, y| unsafe {
            let _ = PostMessageW(hwnd, MSG_POINTER, WPARAM(x as u32 as usize), LPARAM(y as isize));
        });

        log::info!("listeners up: hotkeys (F5/F6), keyboard tap, pointer watcher");

        Ok(Self {
            window,
            _hotkeys: hotkeys,
            _key_tap: key_tap,
            _pointer: pointer,
        })
    }

    /// Pumps the main message loop until the window is destroyed.
    pub fn run(&mut self) {
        let mut msg = MSG::default();
        loop {
            let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            if result.0 == 0 || result.0 == -1 {
                break;
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        log::info!("message loop finished");
    }

    pub fn hwnd(&self) -> HWND {
        self.window.hwnd()
    }
}
