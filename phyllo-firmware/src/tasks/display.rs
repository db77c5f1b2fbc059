//! Display rendering task
//!
//! Renders status screens onto the OLED. Updates are level-triggered:
//! only the latest screen matters, so a slow I2C flush can never build a
//! backlog. Render failures are logged and dropped - the hub keeps
//! running without a display.

use defmt::{info, warn};

use phyllo_core::traits::StatusDisplay;

use crate::channels::SCREEN_UPDATE;
use crate::display::Oled;

/// Display task - renders screen updates
#[embassy_executor::task]
pub async fn display_task(mut oled: Oled) {
    info!("Display task started");

    loop {
        let screen = SCREEN_UPDATE.wait().await;

        if let Err(e) = oled.render(&screen).await {
            warn!("Display render failed: {:?}", e);
        }
    }
}
