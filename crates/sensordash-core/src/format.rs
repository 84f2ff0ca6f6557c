//! Display formatting for raw sensor values
//!
//! Each [`SensorKind`] has one fixed, pure formatter. Vector kinds render as
//! `x=.., y=.., z=..` with two decimals; scalar kinds truncate to an integer
//! and append their unit.

use alloc::format;
use alloc::string::String;
use core::fmt::{self, Write};

use crate::error::{DashError, DashResult};
use crate::sensors::SensorKind;
use crate::store::PLACEHOLDER;

/// Buffer size for the shortest decimal form of an `f32`.
/// The longest is the smallest subnormal, at 47 characters.
const DECIMAL_BUFFER_LEN: usize = 64;

impl SensorKind {
    /// Format raw notification values for display.
    ///
    /// Returns [`DashError::InvalidReading`] when the values must not be shown;
    /// the caller keeps the previous row value in that case.
    pub fn format(self, values: &[f32]) -> DashResult<String> {
        match self {
            Self::Accelerometer | Self::Gyroscope | Self::Magnetometer => {
                Ok(format_vector(values))
            }
            Self::Barometer => {
                first_value(self, values).map(|raw| format!("{} hPa", truncate(raw)))
            }
            Self::AmbientLight => {
                first_value(self, values).map(|raw| format!("{} lx", truncate(raw)))
            }
            Self::StepCounter => {
                first_value(self, values).map(|raw| format!("{}", truncate(raw)))
            }
            Self::HeartRate => {
                let bpm = first_value(self, values)?;
                if bpm.is_nan() {
                    return Err(DashError::InvalidReading {
                        kind: self,
                        reason: "no skin contact",
                    });
                }
                Ok(format!("{} bpm", truncate(bpm)))
            }
        }
    }
}

fn first_value(kind: SensorKind, values: &[f32]) -> DashResult<f32> {
    values.first().copied().ok_or(DashError::InvalidReading {
        kind,
        reason: "no values",
    })
}

/// Render up to three components as `x=<v0>, y=<v1>, z=<v2>`.
pub fn format_vector(values: &[f32]) -> String {
    let mut out = String::new();
    for (i, axis) in ["x", "y", "z"].iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(axis);
        out.push('=');
        match values.get(i) {
            // Writing into a String cannot fail.
            Some(&v) => {
                let _ = write!(out, "{}", Fixed2(v));
            }
            None => out.push_str(PLACEHOLDER),
        }
    }
    out
}

/// Truncate toward zero, saturating at the `i32` range. NaN becomes 0.
pub fn truncate(raw: f32) -> i32 {
    raw as i32
}

/// An `f32` displayed with exactly two decimals.
///
/// Rounding is half away from zero on the value's shortest decimal form, so
/// `1.005` renders as `1.01` even though its binary value is slightly below.
#[derive(Debug, Clone, Copy)]
pub struct Fixed2(pub f32);

impl fmt::Display for Fixed2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return f.write_str("NaN");
        }
        if value.is_infinite() {
            return f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
        }

        // Sign bit cleared; the sign is written separately below.
        let magnitude = f32::from_bits(value.to_bits() & 0x7fff_ffff);
        let mut shortest = heapless::String::<DECIMAL_BUFFER_LEN>::new();
        if write!(shortest, "{}", magnitude).is_err() {
            return write!(f, "{:.2}", value);
        }

        let (int_part, frac_part) = shortest
            .split_once('.')
            .unwrap_or((shortest.as_str(), ""));

        // Integer digits followed by the two kept fraction digits.
        let mut digits = heapless::Vec::<u8, DECIMAL_BUFFER_LEN>::new();
        let frac = frac_part.as_bytes();
        for &b in int_part
            .as_bytes()
            .iter()
            .chain([frac.first(), frac.get(1)].into_iter().map(|d| d.unwrap_or(&b'0')))
        {
            if digits.push(b - b'0').is_err() {
                return write!(f, "{:.2}", value);
            }
        }

        if frac.get(2).is_some_and(|&d| d >= b'5') {
            let mut carry = true;
            for d in digits.iter_mut().rev() {
                if *d == 9 {
                    *d = 0;
                } else {
                    *d += 1;
                    carry = false;
                    break;
                }
            }
            if carry && digits.insert(0, 1).is_err() {
                return write!(f, "{:.2}", value);
            }
        }

        if value.is_sign_negative() {
            f.write_char('-')?;
        }
        let int_len = digits.len() - 2;
        for (i, d) in digits.iter().enumerate() {
            if i == int_len {
                f.write_char('.')?;
            }
            f.write_char(char::from(b'0' + d))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_vector_rounding() {
        assert_eq!(
            format_vector(&[1.005, -2.0, 0.333]),
            "x=1.01, y=-2.00, z=0.33"
        );
    }

    #[test]
    fn test_vector_missing_components() {
        assert_eq!(format_vector(&[0.5]), "x=0.50, y=—, z=—");
        assert_eq!(format_vector(&[]), "x=—, y=—, z=—");
    }

    #[test]
    fn test_vector_ignores_extra_components() {
        assert_eq!(
            format_vector(&[1.0, 2.0, 3.0, 99.0]),
            "x=1.00, y=2.00, z=3.00"
        );
    }

    #[test]
    fn test_fixed2_carries() {
        assert_eq!(Fixed2(9.995).to_string(), "10.00");
        assert_eq!(Fixed2(-0.999).to_string(), "-1.00");
        assert_eq!(Fixed2(0.004).to_string(), "0.00");
        assert_eq!(Fixed2(12.0).to_string(), "12.00");
        assert_eq!(Fixed2(-9.81).to_string(), "-9.81");
        assert_eq!(Fixed2(-0.0).to_string(), "-0.00");
    }

    #[test]
    fn test_fixed2_non_finite() {
        assert_eq!(Fixed2(f32::NAN).to_string(), "NaN");
        assert_eq!(Fixed2(f32::INFINITY).to_string(), "Infinity");
        assert_eq!(Fixed2(f32::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(
            format_vector(&[f32::INFINITY, 1.0, f32::NAN]),
            "x=Infinity, y=1.00, z=NaN"
        );
    }

    #[test]
    fn test_scalar_truncation() {
        assert_eq!(SensorKind::Barometer.format(&[1013.7]).unwrap(), "1013 hPa");
        assert_eq!(SensorKind::AmbientLight.format(&[250.9]).unwrap(), "250 lx");
        assert_eq!(SensorKind::StepCounter.format(&[4821.0]).unwrap(), "4821");
        assert_eq!(SensorKind::HeartRate.format(&[72.6]).unwrap(), "72 bpm");
    }

    #[test]
    fn test_truncation_toward_zero_and_saturation() {
        assert_eq!(truncate(-3.9), -3);
        assert_eq!(truncate(f32::NAN), 0);
        assert_eq!(truncate(1.0e12), i32::MAX);
    }

    #[test]
    fn test_heart_rate_nan_is_invalid() {
        assert_eq!(
            SensorKind::HeartRate.format(&[f32::NAN]),
            Err(DashError::InvalidReading {
                kind: SensorKind::HeartRate,
                reason: "no skin contact",
            })
        );
    }

    #[test]
    fn test_scalar_without_values_is_invalid() {
        assert!(matches!(
            SensorKind::Barometer.format(&[]),
            Err(DashError::InvalidReading {
                kind: SensorKind::Barometer,
                ..
            })
        ));
    }
}
