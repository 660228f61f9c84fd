use core::fmt;

use crate::log_buffer::LogBuffer;
use crate::weather;

/// Raw values gathered in one wake. `None` means the source was unavailable.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Readings {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub pressure: Option<f32>,
    pub illumination: Option<f32>,
    pub battery_voltage: Option<f32>,
    pub solar_panel_voltage: Option<f32>,
}

/// Values computed from [`Readings`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Derived {
    pub temperature_f: Option<f32>,
    pub dew_point: Option<f32>,
    pub dew_point_f: Option<f32>,
    pub pressure_inhg: Option<f32>,
}

impl Derived {
    pub fn compute(readings: &Readings, log: &mut LogBuffer) -> Self {
        let dew_point = match (readings.temperature, readings.humidity) {
            (Some(t), Some(rh)) => match weather::dew_point(t, rh) {
                Ok(dp) => Some(dp),
                Err(e) => {
                    log.warn(format_args!("Dew point not computed for humidity {:.1}: {:?}", rh, e));
                    None
                }
            },
            _ => None,
        };

        Self {
            temperature_f: readings.temperature.map(weather::celsius_to_fahrenheit),
            dew_point,
            dew_point_f: dew_point.map(weather::celsius_to_fahrenheit),
            pressure_inhg: readings.pressure.map(weather::hpa_to_inhg),
        }
    }
}

/// Formats an optional value with a fixed precision, `n/a` when absent.
pub struct Fixed(pub Option<f32>, pub usize);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.*}", self.1, v),
            None => f.write_str("n/a"),
        }
    }
}

/// Human readable summary of the cycle's values.
pub fn log_summary(readings: &Readings, derived: &Derived, log: &mut LogBuffer) {
    log.info(format_args!(
        "Temperature: {} °C ({} °F)",
        Fixed(readings.temperature, 2),
        Fixed(derived.temperature_f, 2)
    ));
    log.info(format_args!("Humidity: {} %", Fixed(readings.humidity, 1)));
    log.info(format_args!("Pressure: {} hPa", Fixed(readings.pressure, 2)));
    log.info(format_args!("Baromin: {} inHg", Fixed(derived.pressure_inhg, 2)));
    log.info(format_args!(
        "Dew Point: {} °C ({} °F)",
        Fixed(derived.dew_point, 2),
        Fixed(derived.dew_point_f, 2)
    ));
    log.info(format_args!("Illumination: {} lx", Fixed(readings.illumination, 1)));
    log.info(format_args!("Battery voltage: {} V", Fixed(readings.battery_voltage, 2)));
    log.info(format_args!(
        "Solar panel voltage: {} V",
        Fixed(readings.solar_panel_voltage, 2)
    ));
}
