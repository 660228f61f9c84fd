//! Derived weather quantities.

use crate::constants::{ADC_MAX_CODE, ADC_REFERENCE_VOLTAGE, VOLTAGE_DIVIDER_MULTIPLIER};

/// Magnus coefficients (Sonntag 1990)
const MAGNUS_B: f32 = 17.62;
const MAGNUS_C: f32 = 243.12;

const HPA_TO_INHG: f32 = 0.02953;

#[derive(Debug, PartialEq)]
pub enum Error {
    HumidityOutOfRange,
}

/// Dew point in °C from temperature in °C and relative humidity in percent.
///
/// Humidity must be strictly positive; values above 100 % are passed through
/// the formula unchanged.
pub fn dew_point(temperature_c: f32, humidity: f32) -> Result<f32, Error> {
    if humidity.is_nan() || humidity <= 0.0 {
        return Err(Error::HumidityOutOfRange);
    }

    let alpha = (MAGNUS_B * temperature_c) / (MAGNUS_C + temperature_c)
        + libm::logf(humidity / 100.0);
    Ok((MAGNUS_C * alpha) / (MAGNUS_B - alpha))
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn hpa_to_inhg(hpa: f32) -> f32 {
    hpa * HPA_TO_INHG
}

/// Voltage at the top of a divider from a raw 12-bit ADC code.
pub fn divider_voltage(code: u16) -> f32 {
    (code as f32 / ADC_MAX_CODE) * ADC_REFERENCE_VOLTAGE * VOLTAGE_DIVIDER_MULTIPLIER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dew_point_reference() {
        let dp = dew_point(22.5, 55.0).unwrap();
        assert!((12.9..=13.1).contains(&dp), "dew point was {}", dp);
    }

    #[test]
    fn test_dew_point_below_ambient() {
        for t in (-30..=45).step_by(5) {
            let t = t as f32;
            for rh in [1.0, 10.0, 35.5, 60.0, 85.0, 99.9] {
                let dp = dew_point(t, rh).unwrap();
                assert!(dp < t, "dew point {} >= {} at {}%", dp, t, rh);
            }
        }
    }

    #[test]
    fn test_dew_point_saturated_equals_ambient() {
        let dp = dew_point(18.0, 100.0).unwrap();
        assert!((dp - 18.0).abs() < 1e-3);
    }

    #[test]
    fn test_dew_point_deterministic() {
        let a = dew_point(7.25, 81.3).unwrap();
        let b = dew_point(7.25, 81.3).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_dew_point_rejects_non_positive_humidity() {
        assert_eq!(dew_point(20.0, 0.0), Err(Error::HumidityOutOfRange));
        assert_eq!(dew_point(20.0, -5.0), Err(Error::HumidityOutOfRange));
        assert_eq!(dew_point(20.0, f32::NAN), Err(Error::HumidityOutOfRange));
    }

    #[test]
    fn test_dew_point_accepts_supersaturation() {
        let dp = dew_point(20.0, 105.0).unwrap();
        assert!(dp > 20.0);
    }

    #[test]
    fn test_fahrenheit_round_trip() {
        for f in [-40.0f32, 0.0, 32.0, 68.5, 98.6, 212.0] {
            let back = celsius_to_fahrenheit(fahrenheit_to_celsius(f));
            assert!((back - f).abs() < 1e-3, "{} -> {}", f, back);
        }
    }

    #[test]
    fn test_known_conversions() {
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
        assert!((hpa_to_inhg(1013.25) - 29.921).abs() < 1e-3);
    }

    #[test]
    fn test_divider_voltage() {
        assert_eq!(divider_voltage(0), 0.0);
        assert!((divider_voltage(4095) - 10.56).abs() < 1e-4);
        assert!((divider_voltage(2048) - 5.281).abs() < 1e-3);
    }
}
