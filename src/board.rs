use embassy_time::Duration;
use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::gpio::{Output, RtcFunction, RtcPin, RtcPinWithResistors};
use esp_hal::peripherals::{
    ADC1, GPIO0, GPIO12, GPIO13, GPIO14, GPIO15, GPIO2, GPIO25, GPIO26, GPIO27, GPIO32, GPIO33,
    GPIO34, GPIO35, GPIO36, GPIO37, GPIO38, GPIO39, GPIO4, LPWR,
};
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use esp_hal::rtc_cntl::Rtc;
use esp_hal::time::Instant;
use esp_hal::Blocking;

use solar_weather_station::cycle::PowerControl;
use solar_weather_station::log_buffer::LogBuffer;
use solar_weather_station::sensors::{AnalogSource, SensorError, VoltageChannel};

use crate::wifi::Wifi;

/// Sensor power rails and the radio, when it came up.
pub struct Board {
    rails: Option<[Output<'static>; 2]>,
    wifi: Option<Wifi>,
}

impl Board {
    pub fn new(rails: [Output<'static>; 2], wifi: Option<Wifi>) -> Self {
        Self {
            rails: Some(rails),
            wifi,
        }
    }
}

impl PowerControl for Board {
    fn elapsed(&self) -> Duration {
        // Counts from reset, unlike the RTC counter which keeps running
        // through deep sleep
        Duration::from_micros(Instant::now().duration_since_epoch().as_micros())
    }

    fn isolate_pins(&mut self) {
        if let Some(mut rails) = self.rails.take() {
            for rail in rails.iter_mut() {
                rail.set_low();
            }
        }

        // SAFETY: the rail drivers were dropped above and the divider pads
        // are not read again; nothing touches a pad between here and sleep.
        unsafe {
            float_pad(GPIO0::steal());
            float_pad(GPIO2::steal());
            float_pad(GPIO4::steal());
            float_pad(GPIO12::steal());
            float_pad(GPIO13::steal());
            float_pad(GPIO14::steal());
            float_pad(GPIO15::steal());
            float_pad(GPIO25::steal());
            float_pad(GPIO26::steal());
            float_pad(GPIO27::steal());
            float_pad(GPIO32::steal());
            float_pad(GPIO33::steal());
            hold_pad(GPIO34::steal());
            hold_pad(GPIO35::steal());
            hold_pad(GPIO36::steal());
            hold_pad(GPIO37::steal());
            hold_pad(GPIO38::steal());
            hold_pad(GPIO39::steal());
        }
    }

    async fn radio_off(&mut self, log: &mut LogBuffer) {
        if let Some(wifi) = self.wifi.as_mut() {
            wifi.stop(log).await;
        }
    }
}

/// Disable the pulls, then isolate and latch the pad.
fn float_pad<P: RtcPinWithResistors>(pin: P) {
    pin.rtcio_pullup(false);
    pin.rtcio_pulldown(false);
    hold_pad(pin);
}

/// Hand the pad to the RTC mux with input and output off, and latch it.
fn hold_pad<P: RtcPin>(pin: P) {
    pin.rtc_set_config(false, true, RtcFunction::Rtc);
    pin.rtcio_pad_hold(true);
}

/// Undo [`hold_pad`] after wake-up so the pad can be driven again.
pub fn release_pad<P: RtcPin>(pin: &P) {
    pin.rtcio_pad_hold(false);
    pin.rtc_set_config(true, false, RtcFunction::Digital);
}

/// Arm the wake-up timer and power down. Never returns.
pub fn deep_sleep(lpwr: LPWR<'static>, duration: Duration) -> ! {
    let mut rtc = Rtc::new(lpwr);
    let timer = TimerWakeupSource::new(core::time::Duration::from_micros(duration.as_micros()));
    rtc.sleep_deep(&[&timer])
}

/// Battery and solar panel dividers on ADC1.
pub struct DividerAdc {
    adc: Adc<'static, ADC1<'static>, Blocking>,
    battery: AdcPin<GPIO34<'static>, ADC1<'static>>,
    solar_panel: AdcPin<GPIO35<'static>, ADC1<'static>>,
}

impl DividerAdc {
    pub fn new(adc1: ADC1<'static>, battery: GPIO34<'static>, solar_panel: GPIO35<'static>) -> Self {
        let mut config = AdcConfig::new();
        let battery = config.enable_pin(battery, Attenuation::_11dB);
        let solar_panel = config.enable_pin(solar_panel, Attenuation::_11dB);

        Self {
            adc: Adc::new(adc1, config),
            battery,
            solar_panel,
        }
    }
}

impl AnalogSource for DividerAdc {
    fn read_code(&mut self, channel: VoltageChannel) -> Result<u16, SensorError> {
        let result = match channel {
            VoltageChannel::Battery => nb::block!(self.adc.read_oneshot(&mut self.battery)),
            VoltageChannel::SolarPanel => {
                nb::block!(self.adc.read_oneshot(&mut self.solar_panel))
            }
        };
        result.map_err(|_| SensorError::AdcFailure)
    }
}
