//! Countdown/count-up timer engine
//!
//! Pure second-counting logic behind the widget. The engine owns the
//! captured duration and the two counters; the UI layer owns the actual
//! 1 Hz timer and calls [`TimerEngine::tick`] once per period. This keeps
//! every property of the tick sequence testable without a running clock.

/// Counting direction selected by the count-down checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Show remaining time, from the configured duration down to zero
    #[default]
    CountDown,
    /// Show elapsed time, from zero up to the configured duration
    CountUp,
}

/// What a single tick produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Show this text; `warning` is set while fewer than the warning
    /// threshold of seconds remain.
    Display { text: String, warning: bool },
    /// The counter ran past its terminal bound; the caller auto-resets.
    Finished,
}

/// Formats a second count as `MM:SS`. Minutes run past 99 unclipped.
pub fn format_clock(seconds: i64) -> String {
    let mm = seconds / 60;
    let ss = seconds % 60;
    format!("{mm:02}:{ss:02}")
}

/// The tick counter state
///
/// `arm` captures the slider value while the widget is ready; `tick` then
/// walks the counters one second per call.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    direction: Direction,
    /// Captured duration in seconds; doubles as the countdown cursor.
    total: i64,
    /// Seconds elapsed since start, used when counting up.
    elapsed: i64,
    /// Warning/alert threshold in remaining seconds.
    warn_below: i64,
}

impl TimerEngine {
    pub fn new(warn_below: i64) -> Self {
        Self {
            direction: Direction::CountDown,
            total: 0,
            elapsed: 0,
            warn_below,
        }
    }

    /// Captures the configured duration and direction. Called on every
    /// ready-state refresh, so starting always picks up the latest slider
    /// position.
    pub fn arm(&mut self, minutes: u32, direction: Direction) {
        self.total = i64::from(minutes) * 60;
        self.elapsed = 0;
        self.direction = direction;
    }

    /// The `MM:00` display shown while the widget is ready.
    pub fn ready_display(minutes: u32) -> String {
        format!("{minutes:02}:00")
    }

    /// Advances the counter by one second.
    ///
    /// Counting down shows `total` and decrements it, so a D-second run
    /// displays D, D-1, .., 0 and reports `Finished` on the following call.
    /// Counting up mirrors this with the elapsed counter; the warning still
    /// tracks the remaining time.
    pub fn tick(&mut self) -> Tick {
        match self.direction {
            Direction::CountDown => {
                if self.total >= 0 {
                    let remaining = self.total;
                    self.total -= 1;
                    Tick::Display {
                        text: format_clock(remaining),
                        warning: remaining < self.warn_below,
                    }
                } else {
                    Tick::Finished
                }
            }
            Direction::CountUp => {
                if self.elapsed <= self.total {
                    let elapsed = self.elapsed;
                    let remaining = self.total - elapsed;
                    self.elapsed += 1;
                    Tick::Display {
                        text: format_clock(elapsed),
                        warning: remaining < self.warn_below,
                    }
                } else {
                    Tick::Finished
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn displays(engine: &mut TimerEngine) -> Vec<(String, bool)> {
        let mut out = Vec::new();
        loop {
            match engine.tick() {
                Tick::Display { text, warning } => out.push((text, warning)),
                Tick::Finished => return out,
            }
        }
    }

    #[test]
    fn format_clock_pads_and_overflows() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3600), "60:00");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn ready_display_shows_configured_minutes() {
        assert_eq!(TimerEngine::ready_display(5), "05:00");
        assert_eq!(TimerEngine::ready_display(60), "60:00");
    }

    #[test]
    fn countdown_walks_from_duration_to_zero() {
        let mut engine = TimerEngine::new(10);
        engine.arm(1, Direction::CountDown);
        let ticks = displays(&mut engine);
        assert_eq!(ticks.len(), 61); // 60 down to 0 inclusive
        assert_eq!(ticks[0].0, "01:00");
        assert_eq!(ticks[55].0, "00:05");
        assert_eq!(ticks[60].0, "00:00");
    }

    #[test]
    fn countdown_display_at_tick_k_is_duration_minus_k() {
        let mut engine = TimerEngine::new(10);
        engine.arm(2, Direction::CountDown);
        for k in 0..=120i64 {
            match engine.tick() {
                Tick::Display { text, .. } => assert_eq!(text, format_clock(120 - k)),
                Tick::Finished => panic!("finished early at tick {k}"),
            }
        }
        assert_eq!(engine.tick(), Tick::Finished);
    }

    #[test]
    fn countdown_warns_below_ten_seconds() {
        let mut engine = TimerEngine::new(10);
        engine.arm(1, Direction::CountDown);
        let ticks = displays(&mut engine);
        for (i, (_, warning)) in ticks.iter().enumerate() {
            let remaining = 60 - i as i64;
            assert_eq!(*warning, remaining < 10, "tick {i}");
        }
    }

    #[test]
    fn count_up_walks_from_zero_to_duration() {
        let mut engine = TimerEngine::new(10);
        engine.arm(1, Direction::CountUp);
        let ticks = displays(&mut engine);
        assert_eq!(ticks.len(), 61);
        assert_eq!(ticks[0].0, "00:00");
        assert_eq!(ticks[60].0, "01:00");
    }

    #[test]
    fn count_up_warning_tracks_remaining_time() {
        let mut engine = TimerEngine::new(10);
        engine.arm(1, Direction::CountUp);
        let ticks = displays(&mut engine);
        // warning once elapsed > 50, i.e. remaining < 10
        assert!(!ticks[50].1);
        assert!(ticks[51].1);
        assert!(ticks[60].1);
    }

    #[test]
    fn rearming_recaptures_the_slider_value() {
        let mut engine = TimerEngine::new(10);
        engine.arm(2, Direction::CountDown);
        assert_eq!(
            engine.tick(),
            Tick::Display {
                text: "02:00".into(),
                warning: false
            }
        );
        engine.arm(1, Direction::CountDown);
        assert_eq!(
            engine.tick(),
            Tick::Display {
                text: "01:00".into(),
                warning: false
            }
        );
    }

    #[test]
    fn pause_resume_keeps_the_cursor() {
        let mut engine = TimerEngine::new(10);
        engine.arm(1, Direction::CountDown);
        for _ in 0..10 {
            engine.tick();
        }
        // pausing is simply not ticking; the next tick continues the walk
        assert_eq!(
            engine.tick(),
            Tick::Display {
                text: "00:50".into(),
                warning: false
            }
        );
    }
}
