//! GPIO button input
//!
//! Samples a push button wired to ground with the internal pull-up
//! enabled, so the raw level is LOW while pressed. Debouncing lives in
//! `phyllo_core::button`; this driver only normalizes the polarity.

use phyllo_core::button::{ButtonEdge, Debouncer};
use phyllo_core::config::ButtonConfig;

/// Trait for GPIO input pin abstraction
pub trait InputPin {
    /// Check if the pin level is high
    fn is_high(&self) -> bool;
}

/// Debounced GPIO button
pub struct GpioButton<P> {
    pin: P,
    debouncer: Debouncer,
    /// If true, pressed = pin LOW (pull-up wiring, the deployed default)
    active_low: bool,
}

impl<P: InputPin> GpioButton<P> {
    /// Create a button on a pull-up input (pressed = LOW)
    pub fn new_pull_up(pin: P, config: ButtonConfig) -> Self {
        Self {
            pin,
            debouncer: Debouncer::new(config),
            active_low: true,
        }
    }

    /// Create a button on a pull-down input (pressed = HIGH)
    pub fn new_pull_down(pin: P, config: ButtonConfig) -> Self {
        Self {
            pin,
            debouncer: Debouncer::new(config),
            active_low: false,
        }
    }

    /// Sample the pin and run the debouncer
    pub fn sample(&mut self, now_ms: u64) -> Option<ButtonEdge> {
        let pressed = self.pin.is_high() != self.active_low;
        self.debouncer.update(pressed, now_ms)
    }

    /// Current debounced state
    pub fn is_pressed(&self) -> bool {
        self.debouncer.is_pressed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Mock GPIO pin for testing
    struct MockPin<'a> {
        level: &'a Cell<bool>,
    }

    impl InputPin for MockPin<'_> {
        fn is_high(&self) -> bool {
            self.level.get()
        }
    }

    #[test]
    fn test_pull_up_press_sequence() {
        let level = Cell::new(true); // idle high
        let mut button = GpioButton::new_pull_up(MockPin { level: &level }, ButtonConfig::default());

        assert_eq!(button.sample(0), None);

        level.set(false); // pressed pulls to ground
        assert_eq!(button.sample(10), None);
        assert_eq!(button.sample(50), Some(ButtonEdge::Pressed));
        assert!(button.is_pressed());

        // Held: quiet
        assert_eq!(button.sample(500), None);

        level.set(true);
        assert_eq!(button.sample(600), None);
        assert_eq!(button.sample(640), Some(ButtonEdge::Released));
    }

    #[test]
    fn test_pull_down_polarity() {
        let level = Cell::new(false);
        let mut button =
            GpioButton::new_pull_down(MockPin { level: &level }, ButtonConfig::default());

        level.set(true);
        button.sample(0);
        assert_eq!(button.sample(40), Some(ButtonEdge::Pressed));
    }

    #[test]
    fn test_contact_bounce_ignored() {
        let level = Cell::new(true);
        let mut button = GpioButton::new_pull_up(MockPin { level: &level }, ButtonConfig::default());

        // Bouncing contact: level flips every sample within the window
        for t in (0..120).step_by(10) {
            level.set(t % 20 == 0);
            assert_eq!(button.sample(t), None);
        }
    }
}
