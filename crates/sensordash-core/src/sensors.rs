//! Logical sensor kinds tracked by the display

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Permission;

/// Number of logical sensor kinds.
pub const SENSOR_KIND_COUNT: usize = 7;

/// One of the seven sensor categories shown on the dashboard.
///
/// The declaration order is the display order: the store is seeded by
/// iterating [`SensorKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
    Barometer,
    AmbientLight,
    StepCounter,
    HeartRate,
}

impl SensorKind {
    pub const ALL: [SensorKind; SENSOR_KIND_COUNT] = [
        Self::Accelerometer,
        Self::Gyroscope,
        Self::Magnetometer,
        Self::Barometer,
        Self::AmbientLight,
        Self::StepCounter,
        Self::HeartRate,
    ];

    /// Row name used in the store and on screen.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Accelerometer => "Accelerometer",
            Self::Gyroscope => "Gyroscope",
            Self::Magnetometer => "Magnetometer",
            Self::Barometer => "Barometer",
            Self::AmbientLight => "Ambient Light",
            Self::StepCounter => "Step Counter",
            Self::HeartRate => "Heart Rate",
        }
    }

    /// Position of this kind in [`SensorKind::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Platform permission that must be granted before the channel can be acquired.
    pub const fn required_permission(self) -> Option<Permission> {
        match self {
            Self::HeartRate => Some(Permission::BodySensors),
            Self::StepCounter => Some(Permission::ActivityRecognition),
            _ => None,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known sensor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSensorKind;

impl fmt::Display for UnknownSensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown sensor kind")
    }
}

impl FromStr for SensorKind {
    type Err = UnknownSensorKind;

    /// Accepts the display name or a snake_case identifier, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.name().eq_ignore_ascii_case(s) || matches_snake_case(kind.name(), s)
            })
            .ok_or(UnknownSensorKind)
    }
}

/// Compare "Ambient Light" against "ambient_light" without allocating.
fn matches_snake_case(name: &str, candidate: &str) -> bool {
    name.len() == candidate.len()
        && name.bytes().zip(candidate.bytes()).all(|(n, c)| {
            if n == b' ' {
                c == b'_'
            } else {
                n.eq_ignore_ascii_case(&c)
            }
        })
}
