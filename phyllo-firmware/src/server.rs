//! HTTP control surface
//!
//! A small dashboard plus two machine endpoints:
//! - `GET /capture` - queue a capture trigger; replies immediately while
//!   the cycle runs in the background
//! - `GET /image.jpg` - the most recent captured frame
//!
//! Served by a pool of picoserve workers over the shared network stack.

use alloc::vec::Vec;

use defmt::warn;
use embassy_executor::{task, Spawner};
use embassy_net::Stack;
use embassy_time::Duration;
use picoserve::response::StatusCode;
use picoserve::routing::get;
use picoserve::{AppRouter, AppWithStateBuilder};
use static_cell::StaticCell;

use phyllo_core::state::TriggerSource;

use crate::channels::{SharedController, TRIGGER_CHANNEL};

/// Concurrent HTTP worker tasks
pub const TASKS: usize = 4;

const TCP_BUFFER: usize = 1024;
const HTTP_BUFFER: usize = 2048;

static INDEX_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Phyllo Hub</title>
    <style>
      body { font-family: system-ui, sans-serif; margin: 20px; }
      button { padding: 10px 16px; font-size: 16px; }
      img { max-width: 100%; height: auto; display: block; margin-top: 16px; border: 1px solid #ddd; }
    </style>
  </head>
  <body>
    <h1>Phyllo Hub</h1>
    <button onclick="capture()">Capture</button>
    <img id="img" src="/image.jpg?ts=0" alt="No image yet" />
    <script>
      async function capture(){
        try {
          await fetch('/capture');
          setTimeout(() => {
            document.getElementById('img').src = '/image.jpg?ts=' + Date.now();
          }, 1500);
        } catch(e){ alert('Capture failed'); }
      }
    </script>
  </body>
</html>
"#;

/// Shared state handed to route handlers
#[derive(Clone, Copy)]
pub struct AppState {
    pub controller: SharedController,
}

pub struct AppProps;

impl AppWithStateBuilder for AppProps {
    type State = AppState;
    type PathRouter = impl picoserve::routing::PathRouter<AppState>;

    fn build_app(self) -> picoserve::Router<Self::PathRouter, Self::State> {
        picoserve::Router::new()
            .route("/", get(|| async { picoserve::response::File::html(INDEX_HTML) }))
            .route("/capture", get(handle_capture))
            .route("/image.jpg", get(handle_image))
    }
}

async fn handle_capture() -> &'static str {
    if TRIGGER_CHANNEL.try_send(TriggerSource::Request).is_err() {
        warn!("Trigger channel full, dropping capture request");
        return r#"{"ok":false,"err":"busy"}"#;
    }
    r#"{"ok":true,"queued":true}"#
}

async fn handle_image(
    picoserve::extract::State(state): picoserve::extract::State<AppState>,
) -> Result<Jpeg, (StatusCode, &'static str)> {
    let image: Option<Vec<u8>> = {
        let controller = state.controller.lock().await;
        controller.last_image().map(Vec::from)
    };

    image.map(Jpeg).ok_or((StatusCode::NOT_FOUND, "No image"))
}

/// A JPEG body for picoserve
pub struct Jpeg(Vec<u8>);

impl picoserve::response::Content for Jpeg {
    fn content_type(&self) -> &'static str {
        "image/jpeg"
    }

    fn content_length(&self) -> usize {
        self.0.len()
    }

    async fn write_content<W: picoserve::io::Write>(self, mut writer: W) -> Result<(), W::Error> {
        writer.write_all(&self.0).await
    }
}

impl picoserve::response::IntoResponse for Jpeg {
    async fn write_to<R: picoserve::io::Read, W: picoserve::response::ResponseWriter<Error = R::Error>>(
        self,
        connection: picoserve::response::Connection<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        picoserve::response::Response::ok(self)
            .write_to(connection, response_writer)
            .await
    }
}

/// Spawn the router and its worker pool
pub fn run(spawner: &Spawner, stack: Stack<'static>, controller: SharedController) {
    static APP: StaticCell<AppRouter<AppProps>> = StaticCell::new();
    let app = APP.init(AppProps.build_app());

    static CONFIG: StaticCell<picoserve::Config<Duration>> = StaticCell::new();
    let config = CONFIG.init(
        picoserve::Config::new(picoserve::Timeouts {
            start_read_request: Some(Duration::from_secs(5)),
            persistent_start_read_request: Some(Duration::from_secs(1)),
            read_request: Some(Duration::from_secs(1)),
            write: Some(Duration::from_secs(2)),
        })
        .keep_connection_alive(),
    );

    let state = AppState { controller };
    for id in 0..TASKS {
        spawner.must_spawn(worker(id, stack, app, config, state));
    }
}

#[task(pool_size = TASKS)]
async fn worker(
    id: usize,
    stack: Stack<'static>,
    app: &'static AppRouter<AppProps>,
    config: &'static picoserve::Config<Duration>,
    state: AppState,
) -> ! {
    let mut tcp_rx = [0; TCP_BUFFER];
    let mut tcp_tx = [0; TCP_BUFFER];
    let mut http = [0; HTTP_BUFFER];

    picoserve::listen_and_serve_with_state(
        id,
        app,
        config,
        stack,
        80,
        &mut tcp_rx,
        &mut tcp_tx,
        &mut http,
        &state,
    )
    .await
}
