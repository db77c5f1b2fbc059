//! Tick task for time-based updates
//!
//! Provides periodic ticks to the controller for:
//! - Capture session deadline checks
//! - Indicator animation
//! - Display refresh

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u32 = 50;

/// Signal to notify the controller of a tick with the current timestamp
pub static TICK_SIGNAL: Signal<CriticalSectionRawMutex, u64> = Signal::new();

/// Tick task - sends periodic tick signals with timestamp
#[embassy_executor::task]
pub async fn tick_task() {
    defmt::info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(TICK_INTERVAL_MS)));

    loop {
        ticker.next().await;
        TICK_SIGNAL.signal(Instant::now().as_millis());
    }
}
