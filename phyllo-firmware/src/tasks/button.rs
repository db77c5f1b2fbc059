//! Button sampling task
//!
//! Samples the push button through the debouncer and turns accepted press
//! edges into capture triggers. Release edges are consumed silently; a
//! held button cannot re-trigger.

use defmt::{debug, info, warn};
use embassy_time::{Duration, Instant, Ticker};

use phyllo_core::button::ButtonEdge;
use phyllo_drivers::GpioButton;

use crate::channels::TRIGGER_CHANNEL;
use crate::components::HubInputPin;
use phyllo_core::state::TriggerSource;

/// Sample cadence; well under the settle time
const SAMPLE_INTERVAL_MS: u64 = 10;

/// Button task - debounced press edges become triggers
#[embassy_executor::task]
pub async fn button_task(mut button: GpioButton<HubInputPin>) {
    info!("Button task started");

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        ticker.next().await;

        match button.sample(Instant::now().as_millis()) {
            Some(ButtonEdge::Pressed) => {
                debug!("Button press accepted");
                if TRIGGER_CHANNEL.try_send(TriggerSource::Button).is_err() {
                    warn!("Trigger channel full, dropping press");
                }
            }
            Some(ButtonEdge::Released) | None => {}
        }
    }
}
