use core::str::FromStr;

use embassy_executor::Spawner;
use embassy_net::{Runner, Stack, StackResources};
use embassy_time::{with_timeout, Duration, Timer};
use esp_hal::rng::Rng;
use esp_wifi::wifi::{ClientConfiguration, Configuration, WifiController, WifiDevice};
use esp_wifi::EspWifiController;
use heapless::String;
use static_cell::StaticCell;

use solar_weather_station::config::CONFIG;
use solar_weather_station::constants::WIFI_POLL_INTERVAL_MS;
use solar_weather_station::log_buffer::LogBuffer;

static RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();

#[derive(Debug)]
pub enum Error {
    WifiInitFailed,
    HostnameTooLong,
    SpawnFailed,
    Configuration,
    Start,
    Association,
    Timeout,
}

pub struct Wifi {
    pub stack: Stack<'static>,
    controller: WifiController<'static>,
}

impl Wifi {
    pub fn new(
        init: &'static EspWifiController<'static>,
        wifi: esp_hal::peripherals::WIFI<'static>,
        mut rng: Rng,
        spawner: Spawner,
    ) -> Result<Self, Error> {
        let (controller, interfaces) =
            esp_wifi::wifi::new(init, wifi).map_err(|_| Error::WifiInitFailed)?;

        let mut dhcp_config = embassy_net::DhcpConfig::default();
        dhcp_config.hostname =
            Some(String::<32>::from_str(CONFIG.hostname).map_err(|_| Error::HostnameTooLong)?);

        let seed = (rng.random() as u64) << 32 | rng.random() as u64;
        let config = embassy_net::Config::dhcpv4(dhcp_config);

        let resources = RESOURCES.init(StackResources::new());
        let (stack, runner) = embassy_net::new(interfaces.sta, config, resources, seed);

        spawner
            .spawn(net_task(runner))
            .map_err(|_| Error::SpawnFailed)?;

        Ok(Self { stack, controller })
    }

    /// Associate and wait for a DHCP lease, giving up after `timeout`.
    pub async fn connect(&mut self, timeout: Duration, log: &mut LogBuffer) -> Result<(), Error> {
        with_timeout(timeout, self.join(log))
            .await
            .map_err(|_| Error::Timeout)?
    }

    async fn join(&mut self, log: &mut LogBuffer) -> Result<(), Error> {
        let client_config = Configuration::Client(ClientConfiguration {
            ssid: CONFIG.wifi_ssid.into(),
            password: CONFIG.wifi_psk.into(),
            ..Default::default()
        });
        self.controller
            .set_configuration(&client_config)
            .map_err(|_| Error::Configuration)?;

        self.controller
            .start_async()
            .await
            .map_err(|_| Error::Start)?;

        log.info(format_args!("About to connect to {:?}...", CONFIG.wifi_ssid));
        self.controller
            .connect_async()
            .await
            .map_err(|_| Error::Association)?;

        while !self.is_connected() {
            Timer::after(Duration::from_millis(WIFI_POLL_INTERVAL_MS)).await;
        }

        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.stack.is_link_up() && self.stack.config_v4().is_some()
    }

    /// Turn the radio off ahead of deep sleep.
    pub async fn stop(&mut self, log: &mut LogBuffer) {
        if let Err(e) = self.controller.stop_async().await {
            log.warn(format_args!("Failed to stop WiFi: {:?}", e));
        }
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
