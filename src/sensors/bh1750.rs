use bh1750_embedded::{r#async::Bh1750Async, Address, Resolution};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use super::{Sensor, SensorError};
use crate::readings::Readings;

/// BH1750 ambient light sensor, ADDR pin low (0x23).
pub struct Bh1750<I2C, D> {
    sensor: Bh1750Async<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> Bh1750<I2C, D> {
    /// The driver has no presence check, so a first conversion stands in for one.
    pub async fn new(i2c: I2C, delay: D) -> Result<Self, SensorError> {
        let mut sensor = Bh1750Async::new(i2c, delay, Address::Low);
        sensor
            .one_time_measurement(Resolution::High)
            .await
            .map_err(|_| SensorError::InitFailure)?;

        Ok(Self { sensor })
    }
}

impl<I2C: I2c, D: DelayNs> Sensor for Bh1750<I2C, D> {
    const NAME: &'static str = "BH1750";

    async fn measure(&mut self, readings: &mut Readings) -> Result<(), SensorError> {
        let lux = self
            .sensor
            .one_time_measurement(Resolution::High)
            .await
            .map_err(|_| SensorError::MeasurementFailure)?;

        readings.illumination = Some(lux);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_buffer::testing::capture;
    use crate::log_buffer::LogBuffer;
    use crate::sensors::testing::{AbsentBus, NoDelay};
    use crate::sensors::{attach, AnalogSource, Sensors, VoltageChannel};
    use embassy_futures::block_on;

    fn detached() -> Bh1750<AbsentBus, NoDelay> {
        Bh1750 {
            sensor: Bh1750Async::new(AbsentBus, NoDelay, Address::Low),
        }
    }

    #[test]
    fn test_absent_device_fails_init() {
        let result = block_on(Bh1750::new(AbsentBus, NoDelay));
        assert!(matches!(result, Err(SensorError::InitFailure)));
    }

    #[test]
    fn test_lost_device_fails_measurement() {
        let mut sensor = detached();
        let mut readings = Readings::default();

        let result = block_on(sensor.measure(&mut readings));
        assert_eq!(result, Err(SensorError::MeasurementFailure));
        assert_eq!(readings.illumination, None);
    }

    struct NoAdc;

    impl AnalogSource for NoAdc {
        fn read_code(&mut self, _channel: VoltageChannel) -> Result<u16, SensorError> {
            Ok(0)
        }
    }

    #[test]
    fn test_read_failure_reaches_console_once() {
        let mut log = LogBuffer::new();
        let mut sensors = Sensors {
            pressure: None::<Bh1750<AbsentBus, NoDelay>>,
            climate: None::<Bh1750<AbsentBus, NoDelay>>,
            light: Some(detached()),
            analog: NoAdc,
        };

        let console = capture(|| {
            block_on(sensors.measure(&mut log));
        });

        assert_eq!(console, ["BH1750 read failed: MeasurementFailure"]);
        assert_eq!(log.lines().collect::<alloc::vec::Vec<_>>(), console);
    }

    #[test]
    fn test_init_failure_reaches_console_once() {
        let mut log = LogBuffer::new();
        let console = capture(|| {
            let sensor = block_on(Bh1750::new(AbsentBus, NoDelay));
            assert!(attach(sensor, &mut log).is_none());
        });

        assert_eq!(console, ["Could not find BH1750!"]);
        assert_eq!(log.as_str(), "Could not find BH1750!\n");
    }
}
