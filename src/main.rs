#![no_std]
#![no_main]

use static_cell::StaticCell;

use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::NoopRawMutex, mutex::Mutex};
use embassy_time::{Delay, Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{self as hal};
use esp_println::logger::init_logger;
use esp_wifi::EspWifiController;

use hal::{
    gpio::{Level, Output, OutputConfig},
    i2c::master::{BusTimeout, I2c},
    rng::Rng,
    time::Rate,
    timer::timg::TimerGroup,
    Async,
};

extern crate alloc;

mod board;
mod transport;
mod wifi;

use solar_weather_station::config::CONFIG;
use solar_weather_station::constants::*;
use solar_weather_station::cycle::DutyCycle;
use solar_weather_station::report::Offline;
use solar_weather_station::sensors::{attach, Aht20, Bh1750, Bmp280, Sensors};

use board::{Board, DividerAdc};
use transport::Transport;
use wifi::Wifi;

esp_bootloader_esp_idf::esp_app_desc!();

static I2C_BUS: StaticCell<Mutex<NoopRawMutex, I2c<'static, Async>>> = StaticCell::new();
static WIFI_INIT: StaticCell<EspWifiController<'static>> = StaticCell::new();
static TRANSPORT: StaticCell<Transport> = StaticCell::new();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    init_logger(log::LevelFilter::Info);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let timg1 = TimerGroup::new(peripherals.TIMG1);

    esp_hal_embassy::init(timg0.timer0);

    let mut cycle = DutyCycle::new(&CONFIG);
    cycle
        .log()
        .info(format_args!("Solar weather station v{}", VERSION));

    // Pads are still latched from the previous sleep
    board::release_pad(&peripherals.GPIO12);
    board::release_pad(&peripherals.GPIO14);
    board::release_pad(&peripherals.GPIO34);
    board::release_pad(&peripherals.GPIO35);

    // Sensor rails: BMP280 + AHT20 on GPIO12, BH1750 on GPIO14
    let rails = [
        Output::new(peripherals.GPIO12, Level::High, OutputConfig::default()),
        Output::new(peripherals.GPIO14, Level::High, OutputConfig::default()),
    ];
    Timer::after(Duration::from_millis(SENSOR_POWER_UP_DELAY_MS)).await;

    let mut rng = Rng::new(peripherals.RNG);

    let wifi = match esp_wifi::init(timg1.timer0, rng.clone(), peripherals.RADIO_CLK) {
        Ok(init) => Wifi::new(WIFI_INIT.init(init), peripherals.WIFI, rng.clone(), spawner)
            .map_err(|e| cycle.log().error(format_args!("WiFi setup failed: {:?}", e)))
            .ok(),
        Err(e) => {
            cycle
                .log()
                .error(format_args!("WiFi init failed: {:?}", e));
            None
        }
    };

    let wifi = match wifi {
        Some(mut wifi) => {
            cycle.log().info(format_args!("Connecting to WiFi..."));
            let timeout = Duration::from_secs(CONFIG.wifi_connect_timeout_seconds as u64);
            match wifi.connect(timeout, cycle.log()).await {
                Ok(()) => {
                    cycle.log().info(format_args!("WiFi connected!"));
                    if let Some(config) = wifi.stack.config_v4() {
                        cycle.log().info(format_args!("{}", config.address.address()));
                    }
                }
                Err(e) => cycle
                    .log()
                    .error(format_args!("WiFi connection failed: {:?}", e)),
            }
            Some(wifi)
        }
        None => None,
    };

    let i2c_config = hal::i2c::master::Config::default()
        .with_frequency(Rate::from_khz(100))
        .with_timeout(BusTimeout::BusCycles(24));

    let i2c_bus = match I2c::new(peripherals.I2C0, i2c_config) {
        Ok(i2c) => {
            let i2c = i2c
                .with_sda(peripherals.GPIO21)
                .with_scl(peripherals.GPIO22)
                .into_async();
            Some(&*I2C_BUS.init(Mutex::new(i2c)))
        }
        Err(e) => {
            cycle
                .log()
                .error(format_args!("I2C init failed: {:?}", e));
            None
        }
    };

    let mut sensors = Sensors {
        pressure: None,
        climate: None,
        light: None,
        analog: DividerAdc::new(peripherals.ADC1, peripherals.GPIO34, peripherals.GPIO35),
    };
    if let Some(bus) = i2c_bus {
        let sensor = Bmp280::new(I2cDevice::new(bus), Delay).await;
        sensors.pressure = attach(sensor, cycle.log());
        let sensor = Aht20::new(I2cDevice::new(bus), Delay).await;
        sensors.climate = attach(sensor, cycle.log());
        let sensor = Bh1750::new(I2cDevice::new(bus), Delay).await;
        sensors.light = attach(sensor, cycle.log());
    }

    let plan = match wifi {
        Some(wifi) => {
            let seed = (rng.random() as u64) << 32 | rng.random() as u64;
            let network = TRANSPORT.init_with(|| Transport::new(wifi.stack, seed));
            let mut board = Board::new(rails, Some(wifi));
            cycle.run(&mut sensors, network, &mut board).await
        }
        None => {
            let mut board = Board::new(rails, None);
            cycle.run(&mut sensors, &mut Offline, &mut board).await
        }
    };

    board::deep_sleep(peripherals.LPWR, plan.duration);
}
