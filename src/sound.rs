//! Audible alert playback
//!
//! The warning beep uses the system alias sounds so no audio asset ships
//! with the binary. Playback is asynchronous and fire-and-forget: the call
//! returns immediately and overlapping ticks are tolerated.

use windows::core::w;
use windows::Win32::Media::Audio::{PlaySoundW, SND_ALIAS, SND_ASYNC};

/// Plays the per-second warning beep.
pub fn play_tick_alert() {
    unsafe {
        let _ = PlaySoundW(w!("SystemAsterisk"), None, SND_ALIAS | SND_ASYNC);
    }
}
