//! Indicator output task
//!
//! Applies animation frames from the controller to the LED and buzzer
//! pins. The animator runs in the controller tick; this task only mirrors
//! its output onto the GPIOs.

use defmt::info;

use phyllo_core::traits::IndicatorOutput;
use phyllo_drivers::GpioIndicator;

use crate::channels::INDICATOR_FRAME;
use crate::components::HubOutputPin;

/// Indicator task - drives red/green LEDs and the buzzer
#[embassy_executor::task]
pub async fn indicator_task(
    mut red: GpioIndicator<HubOutputPin>,
    mut green: GpioIndicator<HubOutputPin>,
    mut buzzer: GpioIndicator<HubOutputPin>,
) {
    info!("Indicator task started");

    loop {
        let frame = INDICATOR_FRAME.wait().await;

        if red.is_on() != frame.red {
            red.set_on(frame.red);
        }
        if green.is_on() != frame.green {
            green.set_on(frame.green);
        }
        if buzzer.is_on() != frame.buzzer {
            buzzer.set_on(frame.buzzer);
        }
    }
}
