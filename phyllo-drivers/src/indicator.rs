//! GPIO indicator output
//!
//! Drives an LED or buzzer through a GPIO pin, directly or via a
//! transistor stage.

use phyllo_core::traits::IndicatorOutput;

/// Trait for GPIO pin abstraction
pub trait OutputPin {
    /// Set the pin high
    fn set_high(&mut self);

    /// Set the pin low
    fn set_low(&mut self);

    /// Check if the pin is set high
    fn is_set_high(&self) -> bool;
}

/// GPIO indicator output
///
/// The pin can be configured as active-high (default) or active-low; the
/// buzzer stage on the deployed board idles high.
pub struct GpioIndicator<P> {
    pin: P,
    /// If true, indicator ON = pin LOW
    inverted: bool,
    /// Current logical state (true = indicator on)
    on: bool,
}

impl<P: OutputPin> GpioIndicator<P> {
    /// Create a new GPIO indicator
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, indicator is ON when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut indicator = Self {
            pin,
            inverted,
            on: false,
        };
        // Ensure indicator starts off
        indicator.set_on(false);
        indicator
    }

    /// Create a new indicator with active-high output
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a new indicator with active-low output
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }
}

impl<P: OutputPin> IndicatorOutput for GpioIndicator<P> {
    fn set_on(&mut self, on: bool) {
        self.on = on;

        if on != self.inverted {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
