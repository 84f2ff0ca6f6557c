//! Error types for the binding layer
//!
//! None of these are fatal. The binding layer resolves each of them locally
//! (placeholder kept, update suppressed) and only reports them through logs
//! and the [`StartReport`](crate::binding::StartReport).

use thiserror_no_std::Error;

use crate::config::Permission;
use crate::sensors::SensorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DashError {
    /// The device has no hardware channel for this kind, or subscribing failed
    #[error("{kind} channel unavailable")]
    ChannelUnavailable { kind: SensorKind },

    /// The platform permission gating this kind was not granted
    #[error("{kind} blocked: {permission} permission denied")]
    PermissionDenied {
        kind: SensorKind,
        permission: Permission,
    },

    /// A notification carried values that cannot be displayed
    #[error("Invalid {kind} reading: {reason}")]
    InvalidReading {
        kind: SensorKind,
        reason: &'static str,
    },
}

impl DashError {
    /// Sensor kind the error refers to.
    pub const fn kind(&self) -> SensorKind {
        match self {
            Self::ChannelUnavailable { kind }
            | Self::PermissionDenied { kind, .. }
            | Self::InvalidReading { kind, .. } => *kind,
        }
    }
}

pub type DashResult<T> = Result<T, DashError>;
