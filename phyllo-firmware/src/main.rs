//! Phyllo - Leaf-health camera hub firmware
//!
//! Main firmware binary for ESP32-based hub boards. The hub triggers an
//! attached camera board over UART, verifies the returned frame, uploads
//! it to the inference server, and shows the analysis on the OLED while
//! driving LEDs, a buzzer, a push button, and a small web dashboard.
//!
//! Named after the Greek "phyllon" (φύλλον), leaf.

#![no_std]
#![no_main]
#![feature(impl_trait_in_assoc_type)]

extern crate alloc;

use core::fmt::Write as _;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::rng::Rng;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, Uart};
use heapless::String;
use static_cell::StaticCell;
use {defmt_rtt as _, esp_backtrace as _};

use phyllo_core::config::{ButtonConfig, IndicatorConfig, LinkConfig, PollConfig, ServerConfig};
use phyllo_core::controller::Controller;
use phyllo_drivers::{GpioButton, GpioIndicator};

use crate::components::{HubInputPin, HubOutputPin};
use crate::display::Oled;
use crate::net::WifiMode;
use crate::tasks::controller::set_status;

mod channels;
mod components;
mod display;
mod net;
mod server;
mod tasks;

/// Camera link baud rate; must match the camera sketch
const CAM_BAUD: u32 = 921_600;

/// Main entry point
#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    info!("Phyllo firmware starting...");

    // Heap for image payloads and the Wi-Fi stack
    esp_alloc::heap_allocator!(size: 96 * 1024);

    let p = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    info!("Peripherals initialized");

    let timg0 = TimerGroup::new(p.TIMG0);
    esp_hal_embassy::init(timg0.timer0);
    let timg1 = TimerGroup::new(p.TIMG1);
    let rng = Rng::new(p.RNG);

    // The orchestrator; the one mutex serializing all device state
    static CONTROLLER: StaticCell<Mutex<CriticalSectionRawMutex, Controller>> = StaticCell::new();
    let controller = &*CONTROLLER.init(Mutex::new(Controller::new(IndicatorConfig::default())));

    // Indicator pins: red GPIO26, green GPIO27, buzzer GPIO25
    let red = GpioIndicator::new_active_high(HubOutputPin(Output::new(
        p.GPIO26,
        Level::Low,
        OutputConfig::default(),
    )));
    let green = GpioIndicator::new_active_high(HubOutputPin(Output::new(
        p.GPIO27,
        Level::Low,
        OutputConfig::default(),
    )));
    let buzzer = GpioIndicator::new_active_high(HubOutputPin(Output::new(
        p.GPIO25,
        Level::Low,
        OutputConfig::default(),
    )));

    // Push button to ground on GPIO14
    let button = GpioButton::new_pull_up(
        HubInputPin(Input::new(
            p.GPIO14,
            InputConfig::default().with_pull(Pull::Up),
        )),
        ButtonConfig::default(),
    );

    // UART2 to the camera: RX GPIO16, TX GPIO17
    let uart = Uart::new(p.UART2, UartConfig::default().with_baudrate(CAM_BAUD))
        .unwrap()
        .with_rx(p.GPIO16)
        .with_tx(p.GPIO17)
        .into_async();
    let (cam_rx, cam_tx) = uart.split();

    spawner.must_spawn(tasks::tick::tick_task());
    spawner.must_spawn(tasks::controller::controller_task(controller));
    spawner.must_spawn(tasks::indicators::indicator_task(red, green, buzzer));
    spawner.must_spawn(tasks::button::button_task(button));
    spawner.must_spawn(tasks::camera::camera_task(cam_rx, cam_tx, LinkConfig::default()));

    // I2C OLED on SDA GPIO21 / SCL GPIO22; the hub runs without it
    let i2c = I2c::new(
        p.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .unwrap()
    .with_sda(p.GPIO21)
    .with_scl(p.GPIO22)
    .into_async();

    match Oled::new(i2c).await {
        Ok(oled) => spawner.must_spawn(tasks::display::display_task(oled)),
        Err(e) => warn!("OLED init failed, continuing headless: {:?}", e),
    }

    set_status(controller, &["Booting..."]).await;

    // Wi-Fi and the TCP/IP stack
    set_status(controller, &["WiFi connecting", env!("WIFI_SSID")]).await;
    let (stack, mode) = net::start(
        spawner,
        net::WifiHardware {
            wifi: p.WIFI,
            timer: timg1.timer0.into(),
            rng,
        },
    )
    .await;

    match mode {
        WifiMode::Station => {
            stack.wait_config_up().await;
            let mut ip_line: String<32> = String::new();
            if let Some(config) = stack.config_v4() {
                let _ = write!(ip_line, "{}", config.address.address());
            }
            info!("WiFi up: {=str}", ip_line);
            set_status(controller, &["WiFi OK", &ip_line]).await;
        }
        WifiMode::AccessPoint => {
            set_status(controller, &["WiFi FAIL", "AP: cam-hub"]).await;
        }
    }

    // Network collaborators: dashboard, upload, result polling
    server::run(&spawner, stack, controller);
    spawner.must_spawn(tasks::upload::upload_task(
        controller,
        stack,
        ServerConfig::default(),
    ));
    spawner.must_spawn(tasks::poll::poll_task(
        stack,
        ServerConfig::default(),
        PollConfig::default(),
    ));

    info!("Hub ready");
}
