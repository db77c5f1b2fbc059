//! Wi-Fi bring-up and network stack
//!
//! Joins the configured home network as a station; if that fails within
//! the boot bound the hub falls back to its own access point so the
//! dashboard stays reachable for diagnosis.

pub mod client;

use defmt::{error, info, warn};
use embassy_executor::{task, Spawner};
use embassy_net::{Runner, Stack, StackResources};
use embassy_time::{with_timeout, Duration, Timer};
use esp_hal::peripherals;
use esp_hal::rng::Rng;
use esp_hal::timer::AnyTimer;
use esp_wifi::wifi::{self, WifiController, WifiDevice, WifiEvent, WifiState};
use esp_wifi::EspWifiController;
use static_cell::StaticCell;

/// STA credentials are baked in at build time
const WIFI_SSID: &str = env!("WIFI_SSID");
const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");

/// Fallback access point when the home network is unreachable
const AP_SSID: &str = "cam-hub";

/// Bound on joining the home network at boot
const JOIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Sockets: server workers + upload + poll + DHCP
const STACK_SOCKETS: usize = crate::server::TASKS + 3;

/// How the stack ended up configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum WifiMode {
    Station,
    AccessPoint,
}

pub struct WifiHardware {
    pub wifi: peripherals::WIFI<'static>,
    pub timer: AnyTimer<'static>,
    pub rng: Rng,
}

/// Bring up Wi-Fi and the TCP/IP stack
pub async fn start(spawner: Spawner, hw: WifiHardware) -> (Stack<'static>, WifiMode) {
    static CONTROLLER: StaticCell<EspWifiController<'static>> = StaticCell::new();
    let initted = CONTROLLER.init(esp_wifi::init(hw.timer, hw.rng).unwrap());

    let (mut controller, interfaces) = wifi::new(initted, hw.wifi).unwrap();

    let mut rng = hw.rng;
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    let joined = match join_home(&mut controller).await {
        Ok(joined) => joined,
        Err(err) => {
            error!("Failed to join home wifi: {:?}", err);
            false
        }
    };

    let (mode, device, config) = if joined {
        let mut dhcp = embassy_net::DhcpConfig::default();
        dhcp.hostname = Some(heapless::String::try_from("phyllo-hub").unwrap());
        (
            WifiMode::Station,
            interfaces.sta,
            embassy_net::Config::dhcpv4(dhcp),
        )
    } else {
        warn!("Starting fallback AP {=str}", AP_SSID);
        let ap_config = wifi::AccessPointConfiguration {
            ssid: AP_SSID.into(),
            ..Default::default()
        };
        controller
            .set_configuration(&wifi::Configuration::AccessPoint(ap_config))
            .unwrap();

        let static_config = embassy_net::StaticConfigV4 {
            address: embassy_net::Ipv4Cidr::new(core::net::Ipv4Addr::new(192, 168, 4, 1), 24),
            gateway: None,
            dns_servers: heapless::Vec::new(),
        };
        (
            WifiMode::AccessPoint,
            interfaces.ap,
            embassy_net::Config::ipv4_static(static_config),
        )
    };

    static RESOURCES: StaticCell<StackResources<STACK_SOCKETS>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(device, config, RESOURCES.init(StackResources::new()), seed);

    spawner.must_spawn(net_task(runner));
    spawner.must_spawn(connection_task(controller, mode));

    (stack, mode)
}

async fn join_home(controller: &mut WifiController<'static>) -> Result<bool, wifi::WifiError> {
    info!("Joining wifi {=str}", WIFI_SSID);

    let config = wifi::ClientConfiguration {
        ssid: WIFI_SSID.into(),
        password: WIFI_PASSWORD.into(),
        auth_method: wifi::AuthMethod::WPA2Personal,
        ..Default::default()
    };
    controller.set_configuration(&wifi::Configuration::Client(config))?;
    controller.start_async().await?;

    match with_timeout(JOIN_TIMEOUT, controller.connect_async()).await {
        Ok(Ok(())) => {
            info!("Wifi connected");
            Ok(true)
        }
        Ok(Err(err)) => {
            controller.stop_async().await?;
            Err(err)
        }
        Err(embassy_time::TimeoutError) => {
            warn!("Wifi join timed out");
            controller.stop_async().await?;
            Ok(false)
        }
    }
}

#[task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// Keeps the link alive: rejoin on disconnect, restart the AP on stop
#[task]
async fn connection_task(mut controller: WifiController<'static>, mode: WifiMode) {
    match mode {
        WifiMode::Station => loop {
            if wifi::sta_state() == WifiState::StaConnected {
                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                warn!("Wifi disconnected");
            }

            while let Err(err) = controller.connect_async().await {
                error!("Failed to rejoin wifi: {:?}", err);
                Timer::after_secs(5).await;
            }
        },

        WifiMode::AccessPoint => loop {
            if wifi::ap_state() == WifiState::ApStarted {
                controller.wait_for_event(WifiEvent::ApStop).await;
                Timer::after_secs(1).await;
            }

            while let Err(err) = controller.start_async().await {
                error!("Failed to restart AP: {:?}", err);
                Timer::after_secs(1).await;
            }
        },
    }
}
