//! Widget window and child controls

pub mod widgets;
pub mod window;

pub use widgets::{WidgetError, Widgets};
pub use window::{WidgetWindow, WindowError, MSG_KEY, MSG_POINTER, MSG_RESET, MSG_START};

/// Null-terminated UTF-16 for the Win32 wide-string APIs.
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
