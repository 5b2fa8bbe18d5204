//! Application configuration
//!
//! One in-memory configuration surface shared by the window shell, the
//! timer logic and the input listeners. Values arrive from compiled-in
//! defaults and are sanitized through the clamp helpers before use; there
//! is no configuration file.

/// Tunable settings for the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Window title (also the window class niceness, not user visible on a
    /// borderless window)
    pub title: String,
    /// Base sizing unit in pixels; all widget metrics derive from it
    pub base_size: i32,
    /// Slider position at startup, in minutes
    pub default_minutes: u32,
    /// Window alpha while the pointer is inside the widget
    pub shown_alpha: u8,
    /// Window alpha while auto-hidden
    pub hidden_alpha: u8,
    /// Tick period of the running timer, milliseconds
    pub tick_interval_ms: u32,
    /// Ready-state refresh period, milliseconds
    pub refresh_interval_ms: u32,
    /// Pointer watcher poll period, milliseconds
    pub pointer_poll_ms: u64,
    /// Quit chord window: F4 must follow Alt within this many milliseconds
    pub chord_window_ms: u64,
    /// Warning styling/alert threshold in remaining seconds
    pub warn_below_secs: i64,
}

impl AppConfig {
    pub const MIN_MINUTES: u32 = 1;
    pub const MAX_MINUTES: u32 = 60;
    pub const MIN_BASE_SIZE: i32 = 6;
    pub const MAX_BASE_SIZE: i32 = 32;

    /// Clamps a minutes value into the slider range.
    pub fn sanitize_minutes(value: u32) -> u32 {
        value.clamp(Self::MIN_MINUTES, Self::MAX_MINUTES)
    }

    /// Clamps the base sizing unit into a usable range.
    pub fn sanitize_base_size(value: i32) -> i32 {
        value.clamp(Self::MIN_BASE_SIZE, Self::MAX_BASE_SIZE)
    }

    /// Returns a copy with every field pulled back into its legal range.
    pub fn sanitized(mut self) -> Self {
        self.default_minutes = Self::sanitize_minutes(self.default_minutes);
        self.base_size = Self::sanitize_base_size(self.base_size);
        self.tick_interval_ms = self.tick_interval_ms.max(100);
        self.refresh_interval_ms = self.refresh_interval_ms.clamp(20, 1000);
        self.pointer_poll_ms = self.pointer_poll_ms.clamp(10, 1000);
        self.chord_window_ms = self.chord_window_ms.clamp(100, 5000);
        self.warn_below_secs = self.warn_below_secs.max(0);
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Timer".to_string(),
            base_size: 10,
            default_minutes: 5,
            shown_alpha: 255,
            hidden_alpha: 204,
            tick_interval_ms: 1000,
            refresh_interval_ms: 100,
            pointer_poll_ms: 50,
            chord_window_ms: 500,
            warn_below_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_already_sane() {
        let config = AppConfig::default();
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn minutes_clamp_to_slider_range() {
        assert_eq!(AppConfig::sanitize_minutes(0), 1);
        assert_eq!(AppConfig::sanitize_minutes(61), 60);
        assert_eq!(AppConfig::sanitize_minutes(30), 30);
    }

    #[test]
    fn sanitized_pulls_intervals_back() {
        let config = AppConfig {
            tick_interval_ms: 1,
            refresh_interval_ms: 0,
            pointer_poll_ms: 0,
            chord_window_ms: 10,
            warn_below_secs: -3,
            ..AppConfig::default()
        }
        .sanitized();
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.refresh_interval_ms, 20);
        assert_eq!(config.pointer_poll_ms, 10);
        assert_eq!(config.chord_window_ms, 100);
        assert_eq!(config.warn_below_secs, 0);
    }
}
