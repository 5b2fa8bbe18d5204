//! tempo-win: an always-on-top countdown/stopwatch desktop widget
//!
//! The crate is split into a pure core and a Win32 shell:
//! - [`domain`] holds the grid layout placer, the timer engine and the
//!   geometry helpers; everything there compiles and tests on any OS.
//! - [`app`] holds the tri-state signal machine and, on Windows, the
//!   controller that owns the window and the listener guards.
//! - [`input`] holds the global listeners (hotkeys, keyboard tap, pointer
//!   watcher) behind capability traits where testing needs them.
//! - [`platform`], [`ui`] and [`sound`] are the Win32-only shell.

pub mod app;
pub mod config;
pub mod domain;
pub mod input;

#[cfg(windows)]
pub mod platform;
#[cfg(windows)]
pub mod sound;
#[cfg(windows)]
pub mod ui;
