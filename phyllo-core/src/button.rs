//! Button debouncing
//!
//! An edge is accepted only after the input level has remained stable for
//! the settle time; while the button is held, further edges are ignored
//! until release. Contact bounce or a held button therefore produces at
//! most one trigger per press.
//!
//! Levels arrive already normalized: `true` = pressed. The GPIO driver
//! handles the active-low pull-up wiring.

use crate::config::ButtonConfig;

/// Accepted, debounced transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    Pressed,
    Released,
}

/// Settle-time debouncer
#[derive(Debug)]
pub struct Debouncer {
    settle_ms: u32,
    /// Most recent raw sample
    last_level: bool,
    /// When the raw level last changed
    last_change_ms: u64,
    /// Debounced level; edges fire when this moves
    stable_level: bool,
}

impl Debouncer {
    /// Create a debouncer; the button starts released
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            settle_ms: config.settle_ms,
            last_level: false,
            last_change_ms: 0,
            stable_level: false,
        }
    }

    /// The current debounced level
    pub fn is_pressed(&self) -> bool {
        self.stable_level
    }

    /// Feed one sample of the (normalized) input level
    ///
    /// Returns an edge when the level has been stable for the settle time
    /// and differs from the debounced state.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<ButtonEdge> {
        if pressed != self.last_level {
            self.last_level = pressed;
            self.last_change_ms = now_ms;
            return None;
        }

        if pressed != self.stable_level
            && now_ms.saturating_sub(self.last_change_ms) >= u64::from(self.settle_ms)
        {
            self.stable_level = pressed;
            return Some(if pressed {
                ButtonEdge::Pressed
            } else {
                ButtonEdge::Released
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer() -> Debouncer {
        Debouncer::new(ButtonConfig { settle_ms: 40 })
    }

    #[test]
    fn test_clean_press_yields_one_edge() {
        let mut d = debouncer();

        assert_eq!(d.update(true, 0), None);
        assert_eq!(d.update(true, 39), None);
        assert_eq!(d.update(true, 40), Some(ButtonEdge::Pressed));

        // Held: no further edges
        assert_eq!(d.update(true, 100), None);
        assert_eq!(d.update(true, 10_000), None);
        assert!(d.is_pressed());
    }

    #[test]
    fn test_bounce_storm_yields_no_edges() {
        let mut d = debouncer();

        // Rapid toggles, every change inside the settle window
        let mut level = true;
        for t in (0..200).step_by(10) {
            assert_eq!(d.update(level, t), None);
            level = !level;
        }
        assert!(!d.is_pressed());
    }

    #[test]
    fn test_release_after_hold() {
        let mut d = debouncer();
        d.update(true, 0);
        assert_eq!(d.update(true, 50), Some(ButtonEdge::Pressed));

        assert_eq!(d.update(false, 60), None);
        assert_eq!(d.update(false, 99), None);
        assert_eq!(d.update(false, 100), Some(ButtonEdge::Released));
        assert!(!d.is_pressed());
    }

    #[test]
    fn test_bounce_then_settle() {
        let mut d = debouncer();

        // Bounces for 30 ms, then holds
        d.update(true, 0);
        d.update(false, 10);
        d.update(true, 20);
        d.update(true, 30);
        assert_eq!(d.update(true, 59), None);
        assert_eq!(d.update(true, 60), Some(ButtonEdge::Pressed));
    }

    #[test]
    fn test_press_release_press() {
        let mut d = debouncer();

        d.update(true, 0);
        assert_eq!(d.update(true, 40), Some(ButtonEdge::Pressed));
        d.update(false, 500);
        assert_eq!(d.update(false, 540), Some(ButtonEdge::Released));
        d.update(true, 1_000);
        assert_eq!(d.update(true, 1_040), Some(ButtonEdge::Pressed));
    }
}
