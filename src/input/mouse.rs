//! Global pointer position watcher
//!
//! The auto-hide behavior needs the pointer position even while the cursor
//! is over other applications, so a background thread polls the OS cursor
//! and hands every sample to a delivery callback. The poll source is a
//! capability trait so the watcher (and everything downstream of it) can be
//! driven by a fake in tests.
//!
//! The delivery callback must be cheap and thread-safe; in the application
//! it posts a window message and nothing else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Where cursor samples come from
pub trait PointerSource: Send + 'static {
    /// Current cursor position in screen coordinates, or None if the
    /// position is temporarily unavailable.
    fn cursor_pos(&mut self) -> Option<(i32, i32)>;
}

/// Production source backed by `GetCursorPos`
#[cfg(windows)]
pub struct SystemPointer;

#[cfg(windows)]
impl PointerSource for SystemPointer {
    fn cursor_pos(&mut self) -> Option<(i32, i32)> {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }
            .ok()
            .map(|()| (point.x, point.y))
    }
}

/// Background polling thread with RAII shutdown
pub struct PointerWatcher {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PointerWatcher {
    /// Spawns the watcher. `deliver` runs on the watcher thread for every
    /// sample the source produces.
    pub fn spawn<S, F>(mut source: S, poll_interval: Duration, deliver: F) -> Self
    where
        S: PointerSource,
        F: Fn(i32, i32) + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);

        let handle = thread::spawn(move || {
            while !thread_shutdown.load(Ordering::Relaxed) {
                if let Some((x, y)) = source.cursor_pos() {
                    deliver(x, y);
                }
                thread::sleep(poll_interval);
            }
        });

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Signals the thread and waits for it to finish.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.shutdown.load(Ordering::Relaxed)
    }
}

impl Drop for PointerWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    struct ScriptedPointer {
        samples: Vec<Option<(i32, i32)>>,
        cursor: usize,
    }

    impl PointerSource for ScriptedPointer {
        fn cursor_pos(&mut self) -> Option<(i32, i32)> {
            let sample = self
                .samples
                .get(self.cursor)
                .copied()
                .unwrap_or(self.samples.last().copied().flatten());
            self.cursor += 1;
            sample
        }
    }

    #[test]
    fn watcher_delivers_samples_from_the_source() {
        let source = ScriptedPointer {
            samples: vec![Some((10, 20)), None, Some((30, 40))],
            cursor: 0,
        };
        let (tx, rx) = mpsc::channel();
        let mut watcher = PointerWatcher::spawn(source, Duration::from_millis(1), move |x, y| {
            let _ = tx.send((x, y));
        });

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (10, 20));
        // the None sample is skipped, not delivered as a zero position
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), (30, 40));

        watcher.stop();
        assert!(!watcher.is_running());
    }

    #[test]
    fn stop_is_idempotent_and_joins() {
        let source = ScriptedPointer {
            samples: vec![Some((0, 0))],
            cursor: 0,
        };
        let mut watcher = PointerWatcher::spawn(source, Duration::from_millis(1), |_, _| {});
        assert!(watcher.is_running());
        watcher.stop();
        watcher.stop();
        assert!(!watcher.is_running());
    }
}
