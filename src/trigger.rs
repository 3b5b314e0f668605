//! Debounce guard for the fire and restart buttons.

use embassy_time::{
    Duration,
    Instant,
};

/// Accepts a trigger edge only if the previous accepted one is more than
/// `window` old. Rejected edges do not restart the window.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    window: Duration,
    last: Option<Instant>,
}

impl Debounce {
    pub const fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Should the edge seen at `now` start a task?
    pub fn accept(&mut self, now: Instant) -> bool {
        let ready = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) > self.window);
        if ready {
            self.last = Some(now);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_ms(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn first_edge_is_accepted() {
        let mut guard = Debounce::new(Duration::from_millis(20));
        assert!(guard.accept(at_ms(5)));
    }

    #[test]
    fn bounce_inside_window_is_ignored() {
        let mut guard = Debounce::new(Duration::from_millis(20));
        let accepted = [100, 103, 110, 120]
            .into_iter()
            .filter(|&ms| guard.accept(at_ms(ms)))
            .count();
        assert_eq!(accepted, 1);
    }

    #[test]
    fn edges_further_apart_than_window_each_count() {
        let mut guard = Debounce::new(Duration::from_millis(20));
        assert!(guard.accept(at_ms(100)));
        assert!(guard.accept(at_ms(121)));
        assert!(guard.accept(at_ms(142)));
    }

    #[test]
    fn rejected_edge_does_not_extend_window() {
        let mut guard = Debounce::new(Duration::from_millis(20));
        assert!(guard.accept(at_ms(100)));
        assert!(!guard.accept(at_ms(115)));
        assert!(guard.accept(at_ms(121)));
    }
}
