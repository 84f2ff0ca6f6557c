use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hub::DeliveryRate;

/// Runtime configuration for the binding layer.
///
/// The formatting policy is fixed; only the delivery rate and the permission
/// state reported by the host are configurable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DashConfig {
    pub rate: DeliveryRate,
    pub permissions: Permissions,
}

/// Platform permissions gating the body and activity sensors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Permissions {
    pub body_sensors: bool,
    pub activity_recognition: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self::all_granted()
    }
}

impl Permissions {
    pub const fn all_granted() -> Self {
        Self {
            body_sensors: true,
            activity_recognition: true,
        }
    }

    pub const fn none_granted() -> Self {
        Self {
            body_sensors: false,
            activity_recognition: false,
        }
    }

    pub const fn is_granted(&self, permission: Permission) -> bool {
        match permission {
            Permission::BodySensors => self.body_sensors,
            Permission::ActivityRecognition => self.activity_recognition,
        }
    }

    pub fn set(&mut self, permission: Permission, granted: bool) {
        match permission {
            Permission::BodySensors => self.body_sensors = granted,
            Permission::ActivityRecognition => self.activity_recognition = granted,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Heart rate and other body sensors
    BodySensors,
    /// Step counting and activity detection
    ActivityRecognition,
}

impl Permission {
    pub const fn name(self) -> &'static str {
        match self {
            Self::BodySensors => "body_sensors",
            Self::ActivityRecognition => "activity_recognition",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [Self::BodySensors, Self::ActivityRecognition]
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashConfig::default();
        assert_eq!(config.rate, DeliveryRate::Ui);
        assert!(config.permissions.is_granted(Permission::BodySensors));
        assert!(config.permissions.is_granted(Permission::ActivityRecognition));
    }

    #[test]
    fn test_set_permission() {
        let mut permissions = Permissions::all_granted();
        permissions.set(Permission::BodySensors, false);
        assert!(!permissions.is_granted(Permission::BodySensors));
        assert!(permissions.is_granted(Permission::ActivityRecognition));
    }

    #[test]
    fn test_parse_permission() {
        assert_eq!("body_sensors".parse(), Ok(Permission::BodySensors));
        assert_eq!(
            "Activity_Recognition".parse(),
            Ok(Permission::ActivityRecognition)
        );
        assert_eq!("camera".parse::<Permission>(), Err(()));
    }
}
