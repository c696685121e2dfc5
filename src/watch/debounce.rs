use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(5);

/// Accepts at most one event per window.
///
/// The first event is always accepted; afterwards an event passes only once at
/// least `window` has elapsed since the last accepted one. Rejected events do
/// not extend the window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        let due = match self.last_accepted {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        };
        if due {
            self.last_accepted = Some(now);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_event_is_accepted() {
        let mut debouncer = Debouncer::default();
        assert!(debouncer.accept(Instant::now()));
    }

    #[test]
    fn test_burst_is_coalesced() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(5));

        let accepted = (0..10)
            .map(|i| start + Duration::from_millis(100 * i))
            .filter(|&at| debouncer.accept(at))
            .count();
        assert_eq!(accepted, 1);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(5));

        assert!(debouncer.accept(start));
        assert!(!debouncer.accept(start + Duration::from_millis(4_999)));
        assert!(debouncer.accept(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_rejected_events_do_not_extend_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(5));

        assert!(debouncer.accept(start));
        assert!(!debouncer.accept(start + Duration::from_secs(4)));
        assert!(debouncer.accept(start + Duration::from_secs(6)));
    }
}
