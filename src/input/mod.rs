//! Global input listeners
//!
//! Three capabilities feed the widget: registered global hotkeys, a
//! low-level keyboard tap for the quit gesture, and a pointer position
//! watcher for auto-hide. Each runs on its own thread and talks to the UI
//! thread only through posted window messages.

pub mod keyboard;
pub mod mouse;

#[cfg(windows)]
pub mod hotkeys;

pub use keyboard::QuitChord;
pub use mouse::{PointerSource, PointerWatcher};

#[cfg(windows)]
pub use hotkeys::{HotkeyError, HotkeyManager, HotkeyModifier, VirtualKey};
#[cfg(windows)]
pub use keyboard::{KeyTap, KeyTapError};
#[cfg(windows)]
pub use mouse::SystemPointer;
