//! Main controller task
//!
//! Routes every stimulus into the orchestrator: triggers, capture
//! outcomes, upload responses, polled results, and timer ticks. After each
//! handled event the screen and indicator outputs are republished for
//! their tasks.
//!
//! The controller mutex is held only for the synchronous handler call,
//! never across an await, so the capture link, the HTTP server, and the
//! animation all keep making progress while any one of them waits.

use defmt::{debug, info};
use embassy_futures::select::{select4, Either4};
use embassy_time::Instant;

use phyllo_core::controller::Action;

use crate::channels::{
    SharedController, CAPTURE_START, INDICATOR_FRAME, OUTCOME_CHANNEL, RESULT_CHANNEL,
    SCREEN_UPDATE, TRIGGER_CHANNEL, UPLOAD_RESPONSE, UPLOAD_START,
};
use crate::tasks::tick::TICK_SIGNAL;

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(controller: SharedController) {
    info!("Controller task started");

    loop {
        match select4(
            TRIGGER_CHANNEL.receive(),
            OUTCOME_CHANNEL.receive(),
            async {
                embassy_futures::select::select(UPLOAD_RESPONSE.receive(), RESULT_CHANNEL.receive())
                    .await
            },
            TICK_SIGNAL.wait(),
        )
        .await
        {
            Either4::First(source) => {
                let now = Instant::now().as_millis();
                let action = {
                    let mut controller = controller.lock().await;
                    controller.on_trigger(source, now)
                };
                match action {
                    Some(Action::StartCapture) => {
                        debug!("Trigger accepted: {:?}", source);
                        CAPTURE_START.signal(());
                    }
                    _ => debug!("Trigger rejected while busy: {:?}", source),
                }
                publish(controller).await;
            }

            Either4::Second(outcome) => {
                let now = Instant::now().as_millis();
                let action = {
                    let mut controller = controller.lock().await;
                    controller.on_capture_outcome(outcome, now)
                };
                if let Some(Action::Upload) = action {
                    UPLOAD_START.signal(());
                }
                publish(controller).await;
            }

            Either4::Third(event) => {
                let now = Instant::now().as_millis();
                {
                    let mut controller = controller.lock().await;
                    match event {
                        embassy_futures::select::Either::First(response) => {
                            controller.on_upload_response(response, now);
                        }
                        embassy_futures::select::Either::Second(result) => {
                            if controller.on_poll_result(&result, now) {
                                info!("Analysis result rendered");
                            }
                        }
                    }
                }
                publish(controller).await;
            }

            Either4::Fourth(now) => {
                let frame = {
                    let mut controller = controller.lock().await;
                    controller.tick(now)
                };
                INDICATOR_FRAME.signal(frame);
                publish(controller).await;
            }
        }
    }
}

/// Push pending screen content to the display task
async fn publish(controller: SharedController) {
    let update = {
        let mut controller = controller.lock().await;
        controller.take_screen_update()
    };
    if let Some(screen) = update {
        SCREEN_UPDATE.signal(screen);
    }
}

/// Convenience for boot-time status messages
pub async fn set_status(controller: SharedController, lines: &[&str]) {
    controller.lock().await.set_status(lines);
    publish(controller).await;
}
