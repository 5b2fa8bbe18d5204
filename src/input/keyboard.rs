//! Global keyboard tap and the quit chord
//!
//! A low-level keyboard hook observes Alt, F4 and Escape system-wide and
//! forwards them to the main window without swallowing anything. Threading
//! rules follow the hook contract:
//! - the hook callback runs on the dedicated tap thread, never the UI thread
//! - the callback never mutates application state directly
//! - every observation is posted to the main window for processing
//!
//! The chord itself ("Alt, then F4 within the chord window") is plain data
//! owned by the window state, so the debounce is testable with injected
//! timestamps.

use std::time::{Duration, Instant};

/// Key transition values carried in the tap message's LPARAM
pub const KEY_DOWN: isize = 0;
pub const KEY_UP: isize = 1;

/// Two-key quit gesture with a debounce window
///
/// An Alt press arms the chord; a following F4 press completes it only
/// while the window is still open. Re-arming on every Alt press is the
/// whole protocol, so there is nothing to disarm.
#[derive(Debug, Clone)]
pub struct QuitChord {
    window: Duration,
    armed_at: Option<Instant>,
}

impl QuitChord {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    /// Records the Alt press.
    pub fn arm(&mut self, now: Instant) {
        self.armed_at = Some(now);
    }

    /// True if an F4 press at `now` lands inside the chord window.
    pub fn completes(&self, now: Instant) -> bool {
        self.armed_at
            .map_or(false, |armed| now.saturating_duration_since(armed) <= self.window)
    }
}

#[cfg(windows)]
pub use tap::{KeyTap, KeyTapError, TAP_VK_ALT, TAP_VK_ESCAPE, TAP_VK_F4};

#[cfg(windows)]
mod tap {
    use super::{KEY_DOWN, KEY_UP};
    use std::sync::atomic::{AtomicIsize, AtomicU32, Ordering};
    use std::sync::mpsc;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::System::Threading::GetCurrentThreadId;
    use windows::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, DispatchMessageW, GetMessageW, PostMessageW, PostThreadMessageW,
        SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT, MSG,
        WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
    };

    const VK_MENU: u32 = 0x12;
    const VK_LMENU: u32 = 0xA4;
    const VK_RMENU: u32 = 0xA5;
    const VK_F4: u32 = 0x73;
    const VK_ESCAPE: u32 = 0x1B;

    /// Canonical key codes delivered in the tap message's WPARAM
    pub const TAP_VK_ALT: usize = VK_MENU as usize;
    pub const TAP_VK_F4: usize = VK_F4 as usize;
    pub const TAP_VK_ESCAPE: usize = VK_ESCAPE as usize;

    // Hook callbacks cannot carry a context pointer, so the delivery target
    // lives in statics written before the hook is installed.
    static TAP_TARGET: AtomicIsize = AtomicIsize::new(0);
    static TAP_MESSAGE: AtomicU32 = AtomicU32::new(0);

    #[derive(Debug, thiserror::Error)]
    pub enum KeyTapError {
        #[error("failed to install low-level keyboard hook: {0}")]
        HookInstallationFailed(String),

        #[error("keyboard tap thread did not start")]
        ThreadStartFailed,

        #[error("keyboard tap thread join failed")]
        ThreadJoinFailed,
    }

    unsafe extern "system" fn tap_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        if code >= 0 {
            let event = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
            let vk = match event.vkCode {
                VK_LMENU | VK_RMENU | VK_MENU => Some(VK_MENU),
                VK_F4 => Some(VK_F4),
                VK_ESCAPE => Some(VK_ESCAPE),
                _ => None,
            };

            let transition = match wparam.0 as u32 {
                WM_KEYDOWN | WM_SYSKEYDOWN => Some(KEY_DOWN),
                WM_KEYUP | WM_SYSKEYUP => Some(KEY_UP),
                _ => None,
            };

            if let (Some(vk), Some(transition)) = (vk, transition) {
                let target = TAP_TARGET.load(Ordering::Acquire);
                let message = TAP_MESSAGE.load(Ordering::Acquire);
                if target != 0 {
                    let _ = PostMessageW(
                        HWND(target),
                        message,
                        WPARAM(vk as usize),
                        LPARAM(transition),
                    );
                }
            }
        }

        // Never swallow; other applications still see the keys.
        CallNextHookEx(None, code, wparam, lparam)
    }

    /// Low-level keyboard hook on its own message-loop thread
    pub struct KeyTap {
        thread_id: u32,
        handle: Option<JoinHandle<()>>,
    }

    impl KeyTap {
        /// Installs the hook and starts forwarding to `target` via the
        /// given app message.
        pub fn install(target: HWND, message: u32) -> Result<Self, KeyTapError> {
            TAP_TARGET.store(target.0, Ordering::Release);
            TAP_MESSAGE.store(message, Ordering::Release);

            let (ready_tx, ready_rx) = mpsc::channel();

            let handle = thread::spawn(move || {
                let install = || -> Result<HHOOK, KeyTapError> {
                    let hinstance = unsafe { GetModuleHandleW(None) }
                        .map_err(|e| KeyTapError::HookInstallationFailed(e.to_string()))?;
                    unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(tap_proc), hinstance, 0) }
                        .map_err(|e| KeyTapError::HookInstallationFailed(e.to_string()))
                };

                let hook = match install() {
                    Ok(hook) => {
                        let thread_id = unsafe { GetCurrentThreadId() };
                        let _ = ready_tx.send(Ok(thread_id));
                        hook
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let mut msg = MSG::default();
                loop {
                    let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                    if result.0 == 0 || result.0 == -1 {
                        break;
                    }
                    if msg.message == WM_QUIT {
                        break;
                    }
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }

                unsafe {
                    let _ = UnhookWindowsHookEx(hook);
                }
            });

            let thread_id = ready_rx
                .recv_timeout(Duration::from_secs(2))
                .map_err(|_| KeyTapError::ThreadStartFailed)??;

            Ok(Self {
                thread_id,
                handle: Some(handle),
            })
        }

        /// Stops the tap thread and removes the hook.
        pub fn uninstall(&mut self) -> Result<(), KeyTapError> {
            if let Some(handle) = self.handle.take() {
                unsafe {
                    let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
                }
                handle.join().map_err(|_| KeyTapError::ThreadJoinFailed)?;
                TAP_TARGET.store(0, Ordering::Release);
            }
            Ok(())
        }
    }

    impl Drop for KeyTap {
        fn drop(&mut self) {
            let _ = self.uninstall();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord() -> QuitChord {
        QuitChord::new(Duration::from_millis(500))
    }

    #[test]
    fn f4_without_alt_does_not_complete() {
        let chord = chord();
        assert!(!chord.completes(Instant::now()));
    }

    #[test]
    fn f4_inside_the_window_completes() {
        let mut chord = chord();
        let armed = Instant::now();
        chord.arm(armed);
        assert!(chord.completes(armed + Duration::from_millis(200)));
        assert!(chord.completes(armed + Duration::from_millis(500)));
    }

    #[test]
    fn f4_after_the_window_does_not_complete() {
        let mut chord = chord();
        let armed = Instant::now();
        chord.arm(armed);
        assert!(!chord.completes(armed + Duration::from_millis(501)));
    }

    #[test]
    fn each_alt_press_rearms() {
        let mut chord = chord();
        let first = Instant::now();
        chord.arm(first);
        let late = first + Duration::from_secs(10);
        assert!(!chord.completes(late));

        chord.arm(late);
        assert!(chord.completes(late + Duration::from_millis(100)));
    }
}
