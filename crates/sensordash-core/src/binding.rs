//! Sensor binding layer
//!
//! Binds each [`SensorKind`] to a hardware channel on start, turns channel
//! notifications into formatted store updates, and releases every channel on
//! stop.
//!
//! ## Startup
//!
//! For every kind, in display order:
//!
//! 1. A kind gated by a permission the host has not granted is skipped with
//!    [`DashError::PermissionDenied`].
//! 2. The hub is asked for the kind's channel and a subscription at the
//!    configured [`DeliveryRate`]. Failure of either step yields
//!    [`DashError::ChannelUnavailable`].
//! 3. Skipped kinds keep the placeholder. There is no retry until the next
//!    start.

use log::{debug, info, warn};

use crate::config::{DashConfig, Permissions};
use crate::error::DashError;
use crate::hub::{ChannelId, DeliveryRate, SensorEvent, SensorHub};
use crate::sensors::{SENSOR_KIND_COUNT, SensorKind};
use crate::store::{PLACEHOLDER, ReadingStore};

/// Result of binding one kind during start.
pub type BindOutcome = Result<ChannelId, DashError>;

/// A live channel and the kind whose formatter handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub channel: ChannelId,
    pub kind: SensorKind,
}

/// Per-kind outcome of a [`SensorBinding::start`] call, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct StartReport {
    outcomes: heapless::Vec<(SensorKind, BindOutcome), SENSOR_KIND_COUNT>,
}

impl StartReport {
    pub fn outcome(&self, kind: SensorKind) -> Option<&BindOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SensorKind, BindOutcome)> {
        self.outcomes.iter()
    }

    /// Number of kinds that got a live channel.
    pub fn bound_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_ok()).count()
    }

    /// Kinds left at the placeholder.
    pub fn unbound(&self) -> impl Iterator<Item = SensorKind> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_err())
            .map(|(kind, _)| *kind)
    }
}

/// What a single notification did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The kind's row took a new value
    Updated(SensorKind),
    /// The formatted value matched the current row
    Unchanged(SensorKind),
    /// The reading was rejected and the row kept its previous value
    Suppressed(DashError),
    /// No registration for the channel, or not a reading
    Ignored,
}

pub struct SensorBinding {
    rate: DeliveryRate,
    permissions: Permissions,
    registrations: heapless::Vec<Registration, SENSOR_KIND_COUNT>,
    active: bool,
}

impl SensorBinding {
    pub fn new(config: DashConfig) -> Self {
        Self {
            rate: config.rate,
            permissions: config.permissions,
            registrations: heapless::Vec::new(),
            active: false,
        }
    }

    pub fn rate(&self) -> DeliveryRate {
        self.rate
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    /// Record the host's current permission state. Takes effect on the next start.
    pub fn set_permissions(&mut self, permissions: Permissions) {
        self.permissions = permissions;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Kind registered for a channel, if any.
    pub fn kind_for(&self, channel: ChannelId) -> Option<SensorKind> {
        self.registrations
            .iter()
            .find(|r| r.channel == channel)
            .map(|r| r.kind)
    }

    /// Acquire and subscribe a channel for every kind.
    ///
    /// A binding that is already active is stopped first, so channels are
    /// always registered from scratch.
    pub fn start<H: SensorHub>(&mut self, hub: &mut H, store: &mut ReadingStore) -> StartReport {
        if self.active {
            self.stop(hub);
        }

        let mut outcomes = heapless::Vec::new();
        for kind in SensorKind::ALL {
            let outcome = self.bind(hub, kind);
            match outcome {
                Ok(channel) => {
                    debug!("{} bound to channel {}", kind, channel.0);
                    // Capacity is one slot per kind.
                    let _ = self.registrations.push(Registration { channel, kind });
                }
                Err(e) => {
                    warn!("{}", e);
                    store.upsert(kind.name(), PLACEHOLDER);
                }
            }
            let _ = outcomes.push((kind, outcome));
        }

        self.active = true;
        let report = StartReport { outcomes };
        info!(
            "Sensor binding started: {}/{} channels at {:?} rate",
            report.bound_count(),
            SENSOR_KIND_COUNT,
            self.rate
        );
        report
    }

    fn bind<H: SensorHub>(&self, hub: &mut H, kind: SensorKind) -> BindOutcome {
        if let Some(permission) = kind.required_permission()
            && !self.permissions.is_granted(permission)
        {
            return Err(DashError::PermissionDenied { kind, permission });
        }

        let channel = hub
            .acquire(kind)
            .ok_or(DashError::ChannelUnavailable { kind })?;

        hub.subscribe(channel, self.rate).map_err(|e| {
            warn!("Subscribing {} on channel {} failed: {:?}", kind, channel.0, e);
            DashError::ChannelUnavailable { kind }
        })?;

        Ok(channel)
    }

    /// Release every registered channel. Later notifications are ignored.
    pub fn stop<H: SensorHub>(&mut self, hub: &mut H) {
        for registration in self.registrations.iter() {
            hub.unsubscribe(registration.channel);
        }
        if self.active {
            info!(
                "Sensor binding stopped, released {} channels",
                self.registrations.len()
            );
        }
        self.registrations.clear();
        self.active = false;
    }

    /// Route one notification through its kind's formatter into the store.
    pub fn dispatch(&self, event: &SensorEvent, store: &mut ReadingStore) -> DispatchOutcome {
        let SensorEvent::Reading { channel, values } = event else {
            if let SensorEvent::Accuracy { channel, accuracy } = event {
                debug!("Channel {} accuracy now {:?}", channel.0, accuracy);
            }
            return DispatchOutcome::Ignored;
        };

        let Some(kind) = self.kind_for(*channel) else {
            return DispatchOutcome::Ignored;
        };

        match kind.format(values) {
            Ok(value) => {
                if store.upsert(kind.name(), &value) {
                    debug!("{} = {}", kind, value);
                    DispatchOutcome::Updated(kind)
                } else {
                    DispatchOutcome::Unchanged(kind)
                }
            }
            Err(e) => {
                debug!("{}, keeping previous value", e);
                DispatchOutcome::Suppressed(e)
            }
        }
    }
}
