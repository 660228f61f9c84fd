use aht20_async::Aht20 as Driver;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use super::{Sensor, SensorError};
use crate::readings::Readings;

/// AHT20 temperature and humidity sensor.
pub struct Aht20<I2C, D> {
    sensor: Driver<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> Aht20<I2C, D> {
    pub async fn new(i2c: I2C, delay: D) -> Result<Self, SensorError> {
        let sensor = Driver::new(i2c, delay)
            .await
            .map_err(|_| SensorError::InitFailure)?;

        Ok(Self { sensor })
    }
}

impl<I2C: I2c, D: DelayNs> Sensor for Aht20<I2C, D> {
    const NAME: &'static str = "AHT20";

    async fn measure(&mut self, readings: &mut Readings) -> Result<(), SensorError> {
        let (humidity, temperature) = self
            .sensor
            .read()
            .await
            .map_err(|_| SensorError::MeasurementFailure)?;

        readings.temperature = Some(temperature.celsius());
        readings.humidity = Some(humidity.rh());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::testing::{AbsentBus, NoDelay};
    use embassy_futures::block_on;

    #[test]
    fn test_absent_device_fails_init() {
        let result = block_on(Aht20::new(AbsentBus, NoDelay));
        assert!(matches!(result, Err(SensorError::InitFailure)));
    }
}
