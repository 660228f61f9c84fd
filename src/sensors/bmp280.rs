use bme280::i2c::AsyncBME280;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use super::{Sensor, SensorError};
use crate::readings::Readings;

/// BMP280 barometer on the secondary address (0x77).
pub struct Bmp280<I2C, D> {
    sensor: AsyncBME280<I2C>,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Bmp280<I2C, D> {
    pub async fn new(i2c: I2C, mut delay: D) -> Result<Self, SensorError> {
        let mut sensor = AsyncBME280::new_secondary(i2c);
        sensor
            .init(&mut delay)
            .await
            .map_err(|_| SensorError::InitFailure)?;

        Ok(Self { sensor, delay })
    }
}

impl<I2C: I2c, D: DelayNs> Sensor for Bmp280<I2C, D> {
    const NAME: &'static str = "BMP280";

    async fn measure(&mut self, readings: &mut Readings) -> Result<(), SensorError> {
        let sample = self
            .sensor
            .measure(&mut self.delay)
            .await
            .map_err(|_| SensorError::MeasurementFailure)?;

        // Driver reports Pa
        readings.pressure = Some(sample.pressure / 100.0);
        Ok(())
    }
}
