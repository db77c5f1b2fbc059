//! Camera link task
//!
//! Owns the UART to the camera board. On each capture request it flushes
//! stale bytes, writes the trigger, and runs one `CaptureSession` to a
//! terminal outcome. Reads are raced against a short timer so session
//! deadlines are checked even when the line goes quiet; the task itself
//! never blocks unboundedly.

use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer, WithTimeout};
use embedded_io_async::{Read, Write};
use esp_hal::uart::{UartRx, UartTx};
use esp_hal::Async;

use phyllo_core::capture::CaptureSession;
use phyllo_core::config::LinkConfig;

use crate::channels::{CAPTURE_START, OUTCOME_CHANNEL};

/// UART read chunk size
const RX_BUF_SIZE: usize = 256;

/// Deadline-check cadence while the line is quiet
const POLL_INTERVAL_MS: u64 = 50;

/// Camera task - drives capture sessions over the UART
#[embassy_executor::task]
pub async fn camera_task(
    mut rx: UartRx<'static, Async>,
    mut tx: UartTx<'static, Async>,
    config: LinkConfig,
) {
    info!("Camera task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        CAPTURE_START.wait().await;

        flush_stale(&mut rx, &mut buf).await;

        let mut session = CaptureSession::start(&config, Instant::now().as_millis());
        if let Err(e) = tx.write_all(&[session.trigger_byte()]).await {
            warn!("Trigger write failed: {:?}", e);
        }
        let _ = tx.flush().await;
        debug!("Trigger sent, awaiting frame");

        let outcome = loop {
            match select(
                rx.read(&mut buf),
                Timer::after(Duration::from_millis(POLL_INTERVAL_MS)),
            )
            .await
            {
                Either::First(Ok(n)) if n > 0 => {
                    if let Some(outcome) = session.feed(&buf[..n], Instant::now().as_millis()) {
                        break outcome;
                    }
                }
                Either::First(Ok(_)) => {}
                Either::First(Err(e)) => {
                    warn!("UART read error: {:?}", e);
                }
                Either::Second(()) => {
                    if let Some(outcome) = session.poll(Instant::now().as_millis()) {
                        break outcome;
                    }
                }
            }
        };

        info!("Capture session finished: {=str}", outcome.message());
        OUTCOME_CHANNEL.send(outcome).await;
    }
}

/// Drain whatever is sitting in the receive buffer before triggering
async fn flush_stale(rx: &mut UartRx<'static, Async>, buf: &mut [u8]) {
    loop {
        match rx
            .read(buf)
            .with_timeout(Duration::from_millis(2))
            .await
        {
            Ok(Ok(n)) if n > 0 => debug!("Flushed {} stale bytes", n),
            _ => break,
        }
    }
}
