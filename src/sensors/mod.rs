use crate::log_buffer::LogBuffer;
use crate::readings::Readings;
use crate::weather;

pub mod aht20;
pub mod bh1750;
pub mod bmp280;

pub use aht20::Aht20;
pub use bh1750::Bh1750;
pub use bmp280::Bmp280;

#[derive(Debug, PartialEq)]
pub enum SensorError {
    InitFailure,
    MeasurementFailure,
    AdcFailure,
}

pub trait Sensor {
    /// Name used in diagnostics
    const NAME: &'static str;

    /// Fill in the fields this sensor provides. Fields are only written on
    /// success.
    async fn measure(&mut self, readings: &mut Readings) -> Result<(), SensorError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoltageChannel {
    Battery,
    SolarPanel,
}

/// One-shot access to the voltage divider inputs.
pub trait AnalogSource {
    /// Raw 12-bit conversion result
    fn read_code(&mut self, channel: VoltageChannel) -> Result<u16, SensorError>;
}

/// Log the outcome of a driver initialisation, keeping the driver on success.
pub fn attach<S: Sensor>(init: Result<S, SensorError>, log: &mut LogBuffer) -> Option<S> {
    match init {
        Ok(sensor) => Some(sensor),
        Err(_) => {
            log.error(format_args!("Could not find {}!", S::NAME));
            None
        }
    }
}

/// The station's peripherals. A `None` slot is a sensor that failed to
/// initialise; it stays silent during measurement.
pub struct Sensors<P, C, L, A> {
    pub pressure: Option<P>,
    pub climate: Option<C>,
    pub light: Option<L>,
    pub analog: A,
}

impl<P, C, L, A> Sensors<P, C, L, A>
where
    P: Sensor,
    C: Sensor,
    L: Sensor,
    A: AnalogSource,
{
    pub async fn measure(&mut self, log: &mut LogBuffer) -> Readings {
        let mut readings = Readings::default();

        measure_optional(&mut self.pressure, &mut readings, log).await;
        measure_optional(&mut self.climate, &mut readings, log).await;
        measure_optional(&mut self.light, &mut readings, log).await;

        readings.battery_voltage = read_voltage(&mut self.analog, VoltageChannel::Battery, log);
        readings.solar_panel_voltage =
            read_voltage(&mut self.analog, VoltageChannel::SolarPanel, log);

        readings
    }
}

async fn measure_optional<S: Sensor>(
    sensor: &mut Option<S>,
    readings: &mut Readings,
    log: &mut LogBuffer,
) {
    if let Some(sensor) = sensor {
        if let Err(e) = sensor.measure(readings).await {
            log.error(format_args!("{} read failed: {:?}", S::NAME, e));
        }
    }
}

fn read_voltage<A: AnalogSource>(
    analog: &mut A,
    channel: VoltageChannel,
    log: &mut LogBuffer,
) -> Option<f32> {
    match analog.read_code(channel) {
        Ok(code) => Some(weather::divider_voltage(code)),
        Err(e) => {
            log.error(format_args!("{:?} voltage read failed: {:?}", channel, e));
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    struct FakePressure(Result<f32, ()>);

    impl Sensor for FakePressure {
        const NAME: &'static str = "BMP280";

        async fn measure(&mut self, readings: &mut Readings) -> Result<(), SensorError> {
            let hpa = self.0.map_err(|_| SensorError::MeasurementFailure)?;
            readings.pressure = Some(hpa);
            Ok(())
        }
    }

    struct FakeClimate;

    impl Sensor for FakeClimate {
        const NAME: &'static str = "AHT20";

        async fn measure(&mut self, readings: &mut Readings) -> Result<(), SensorError> {
            readings.temperature = Some(19.5);
            readings.humidity = Some(62.0);
            Ok(())
        }
    }

    struct FakeLight;

    impl Sensor for FakeLight {
        const NAME: &'static str = "BH1750";

        async fn measure(&mut self, readings: &mut Readings) -> Result<(), SensorError> {
            readings.illumination = Some(1200.0);
            Ok(())
        }
    }

    struct FakeAdc {
        battery: Result<u16, SensorError>,
        solar: u16,
    }

    impl AnalogSource for FakeAdc {
        fn read_code(&mut self, channel: VoltageChannel) -> Result<u16, SensorError> {
            match channel {
                VoltageChannel::Battery => match &self.battery {
                    Ok(code) => Ok(*code),
                    Err(_) => Err(SensorError::AdcFailure),
                },
                VoltageChannel::SolarPanel => Ok(self.solar),
            }
        }
    }

    fn adc() -> FakeAdc {
        FakeAdc {
            battery: Ok(4095),
            solar: 0,
        }
    }

    #[test]
    fn test_attach_logs_missing_sensor() {
        let mut log = LogBuffer::new();
        let sensor = attach::<FakePressure>(Err(SensorError::InitFailure), &mut log);
        assert!(sensor.is_none());
        assert_eq!(log.as_str(), "Could not find BMP280!\n");
    }

    #[test]
    fn test_attach_keeps_present_sensor() {
        let mut log = LogBuffer::new();
        let sensor = attach(Ok(FakeLight), &mut log);
        assert!(sensor.is_some());
        assert!(log.is_empty());
    }

    #[test]
    fn test_all_sensors_present() {
        let mut log = LogBuffer::new();
        let mut sensors = Sensors {
            pressure: Some(FakePressure(Ok(1001.5))),
            climate: Some(FakeClimate),
            light: Some(FakeLight),
            analog: adc(),
        };
        let readings = block_on(sensors.measure(&mut log));

        assert_eq!(readings.pressure, Some(1001.5));
        assert_eq!(readings.temperature, Some(19.5));
        assert_eq!(readings.humidity, Some(62.0));
        assert_eq!(readings.illumination, Some(1200.0));
        assert!((readings.battery_voltage.unwrap() - 10.56).abs() < 1e-4);
        assert_eq!(readings.solar_panel_voltage, Some(0.0));
        assert!(log.is_empty());
    }

    #[test]
    fn test_missing_pressure_does_not_block_others() {
        let mut log = LogBuffer::new();
        let mut sensors = Sensors {
            pressure: None::<FakePressure>,
            climate: Some(FakeClimate),
            light: Some(FakeLight),
            analog: adc(),
        };
        let readings = block_on(sensors.measure(&mut log));

        assert_eq!(readings.pressure, None);
        assert_eq!(readings.temperature, Some(19.5));
        assert_eq!(readings.illumination, Some(1200.0));
        assert!(readings.battery_voltage.is_some());
    }

    #[test]
    fn test_read_failure_is_logged_and_absent() {
        let mut log = LogBuffer::new();
        let mut sensors = Sensors {
            pressure: Some(FakePressure(Err(()))),
            climate: None::<FakeClimate>,
            light: Some(FakeLight),
            analog: FakeAdc {
                battery: Err(SensorError::AdcFailure),
                solar: 2048,
            },
        };
        let readings = block_on(sensors.measure(&mut log));

        assert_eq!(readings.pressure, None);
        assert_eq!(readings.temperature, None);
        assert_eq!(readings.battery_voltage, None);
        assert!(readings.solar_panel_voltage.is_some());
        assert_eq!(
            log.as_str(),
            "BMP280 read failed: MeasurementFailure\nBattery voltage read failed: AdcFailure\n"
        );
    }
}
