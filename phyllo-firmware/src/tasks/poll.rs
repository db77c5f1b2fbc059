//! Result polling task
//!
//! Periodically fetches the latest analysis result from the inference
//! server and forwards it to the controller. The correlator decides
//! whether a fetched result is new; this task does no filtering of its
//! own. Poll failures are logged and recovered locally - the next tick
//! simply tries again.

use defmt::{debug, info, warn};
use embassy_net::Stack;
use embassy_time::{Duration, Ticker};

use phyllo_core::config::{PollConfig, ServerConfig};

use crate::channels::RESULT_CHANNEL;
use crate::net::client;

/// Poll task - periodic `GET /result`
#[embassy_executor::task]
pub async fn poll_task(stack: Stack<'static>, server: ServerConfig, config: PollConfig) {
    info!("Poll task started");

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config.interval_ms)));

    loop {
        ticker.next().await;

        match client::fetch_result(stack, &server).await {
            Ok(Some(result)) => {
                if RESULT_CHANNEL.try_send(result).is_err() {
                    debug!("Result channel full, dropping poll result");
                }
            }
            Ok(None) => debug!("No analysis available yet"),
            Err(e) => warn!("Result poll failed: {:?}", e),
        }
    }
}
