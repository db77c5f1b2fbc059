//! Board pin adapters
//!
//! Newtype wrappers binding esp-hal GPIO types to the pin traits the
//! driver crate expects.

use esp_hal::gpio::{Input, Output};

/// An esp-hal push-pull output adapted to the driver pin trait
pub struct HubOutputPin(pub Output<'static>);

impl phyllo_drivers::OutputPin for HubOutputPin {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// An esp-hal input adapted to the driver pin trait
pub struct HubInputPin(pub Input<'static>);

impl phyllo_drivers::InputPin for HubInputPin {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}
