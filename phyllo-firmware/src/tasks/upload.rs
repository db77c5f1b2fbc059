//! Upload task
//!
//! POSTs the retained image to the inference server when the controller
//! asks for it. The image is copied out under the controller lock so the
//! lock is never held across the network request.

use alloc::vec::Vec;

use defmt::{info, warn};
use embassy_net::Stack;
use heapless::String;

use phyllo_core::config::ServerConfig;
use phyllo_core::controller::UploadResponse;

use crate::channels::{SharedController, UPLOAD_RESPONSE, UPLOAD_START};
use crate::net::client;

/// Upload task - ships captured images to the inference server
#[embassy_executor::task]
pub async fn upload_task(
    controller: SharedController,
    stack: Stack<'static>,
    server: ServerConfig,
) {
    info!("Upload task started");

    loop {
        UPLOAD_START.wait().await;

        let image: Option<Vec<u8>> = {
            let controller = controller.lock().await;
            controller.last_image().map(Vec::from)
        };

        let response = match image {
            Some(image) => {
                info!("Uploading {} bytes", image.len());
                client::upload(stack, &server, &image).await
            }
            None => {
                warn!("Upload requested with no image retained");
                UploadResponse::Failed {
                    reason: String::try_from("no image").unwrap(),
                }
            }
        };

        UPLOAD_RESPONSE.send(response).await;
    }
}
