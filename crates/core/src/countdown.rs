//! Frame-driven countdown shown before a module starts.

use crate::types::DEFAULT_COUNTDOWN_SECS;

/// A one-shot timer advanced by the frame tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    duration: f32,
    remaining: f32,
    running: bool,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_SECS)
    }
}

impl Countdown {
    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn start(&mut self) {
        self.remaining = self.duration;
        self.running = true;
    }

    pub fn cancel(&mut self) {
        self.running = false;
        self.remaining = self.duration;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Whole seconds left, rounded up (3, 2, 1).
    pub fn seconds_left(&self) -> u32 {
        self.remaining.max(0.0).ceil() as u32
    }

    /// Advance by `dt`; returns `true` on the tick the countdown finishes.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.running = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_fires_once() {
        let mut c = Countdown::new(1.0);
        assert!(!c.tick(1.0));
        c.start();
        assert_eq!(c.seconds_left(), 1);
        assert!(!c.tick(0.6));
        assert!(c.tick(0.6));
        assert!(!c.tick(0.6));
        assert!(!c.is_running());
    }

    #[test]
    fn test_zero_countdown_finishes_on_first_tick() {
        let mut c = Countdown::new(0.0);
        c.start();
        assert!(c.tick(0.0));
    }

    #[test]
    fn test_seconds_left_rounds_up() {
        let mut c = Countdown::default();
        c.start();
        assert_eq!(c.seconds_left(), 3);
        c.tick(0.5);
        assert_eq!(c.seconds_left(), 3);
        c.tick(1.0);
        assert_eq!(c.seconds_left(), 2);
    }
}
