//! Application signal state machine
//!
//! The widget's control state is a tri-state signal: ready, running,
//! paused. The start action toggles between running and paused; reset
//! returns to ready from anywhere, as does the counter reaching its
//! terminal bound.

/// The tri-state control signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signal {
    /// Waiting for a start; slider and toggles are live
    #[default]
    Ready,
    /// Ticking once per second
    Running,
    /// Tick canceled, counters frozen
    Paused,
}

impl Signal {
    pub fn is_ready(self) -> bool {
        matches!(self, Signal::Ready)
    }

    pub fn is_running(self) -> bool {
        matches!(self, Signal::Running)
    }
}

/// Events that move the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// Start button or F5
    StartPressed,
    /// Reset button or F6
    ResetPressed,
    /// The engine reported its terminal bound
    Expired,
}

/// State machine for the control signal
pub struct SignalMachine;

impl SignalMachine {
    /// Processes an event and returns the new signal.
    pub fn process_event(current: Signal, event: SignalEvent) -> Signal {
        match (current, event) {
            (Signal::Ready, SignalEvent::StartPressed) => Signal::Running,
            (Signal::Running, SignalEvent::StartPressed) => Signal::Paused,
            (Signal::Paused, SignalEvent::StartPressed) => Signal::Running,

            (_, SignalEvent::ResetPressed) => Signal::Ready,
            (_, SignalEvent::Expired) => Signal::Ready,
        }
    }
}

/// Visibility transition requested by a pointer observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    /// Restore the secondary rows and full opacity
    Reveal,
    /// Hide everything but the time display and dim the window
    Conceal,
}

/// Auto-hide state driven by pointer containment
///
/// Every pointer sample produces an observation; only the first sample on
/// each side of the window border yields a transition, so the show/hide
/// side effects stay idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Visibility {
    shown: bool,
}

impl Visibility {
    pub fn is_shown(self) -> bool {
        self.shown
    }

    /// Records whether the pointer is inside the window rectangle.
    pub fn observe(&mut self, inside: bool) -> Option<VisibilityChange> {
        match (self.shown, inside) {
            (false, true) => {
                self.shown = true;
                Some(VisibilityChange::Reveal)
            }
            (true, false) => {
                self.shown = false;
                Some(VisibilityChange::Conceal)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_signal_is_ready() {
        assert!(Signal::default().is_ready());
    }

    #[test]
    fn start_walks_ready_running_paused_running() {
        let s = SignalMachine::process_event(Signal::Ready, SignalEvent::StartPressed);
        assert_eq!(s, Signal::Running);

        let s = SignalMachine::process_event(s, SignalEvent::StartPressed);
        assert_eq!(s, Signal::Paused);

        let s = SignalMachine::process_event(s, SignalEvent::StartPressed);
        assert_eq!(s, Signal::Running);
    }

    #[test]
    fn reset_returns_to_ready_from_every_state() {
        for state in [Signal::Ready, Signal::Running, Signal::Paused] {
            assert_eq!(
                SignalMachine::process_event(state, SignalEvent::ResetPressed),
                Signal::Ready
            );
        }
    }

    #[test]
    fn expiry_behaves_like_reset() {
        assert_eq!(
            SignalMachine::process_event(Signal::Running, SignalEvent::Expired),
            Signal::Ready
        );
    }

    #[test]
    fn visibility_transitions_only_on_border_crossings() {
        let mut visibility = Visibility::default();
        assert!(!visibility.is_shown());

        assert_eq!(visibility.observe(true), Some(VisibilityChange::Reveal));
        assert!(visibility.is_shown());
        assert_eq!(visibility.observe(true), None);

        assert_eq!(visibility.observe(false), Some(VisibilityChange::Conceal));
        assert_eq!(visibility.observe(false), None);
        assert!(!visibility.is_shown());
    }
}
