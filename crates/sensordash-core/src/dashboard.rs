//! Dashboard lifecycle
//!
//! [`SensorDashboard`] ties the hardware hub, the binding layer and the
//! reading store together and maps the platform's screen lifecycle onto them:
//! `resume` binds every channel, `pause` releases them. The store outlives
//! pauses, so rows keep their last value while the screen is inactive.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, info};

use crate::binding::{DispatchOutcome, SensorBinding, StartReport};
use crate::config::{DashConfig, Permissions};
use crate::hub::{EventQueue, SensorEvent, SensorHub};
use crate::sensors::SensorKind;
use crate::store::ReadingStore;

/// Dashboard guarded for hosts that touch it from more than one thread.
pub type SharedDashboard<H> = Mutex<CriticalSectionRawMutex, RefCell<SensorDashboard<H>>>;

pub struct SensorDashboard<H: SensorHub> {
    hub: H,
    binding: SensorBinding,
    store: ReadingStore,
}

impl<H: SensorHub> SensorDashboard<H> {
    /// Create the dashboard with a placeholder row for every kind.
    ///
    /// No channel is touched until [`resume`](Self::resume).
    pub fn new(hub: H, config: DashConfig) -> Self {
        Self {
            hub,
            binding: SensorBinding::new(config),
            store: ReadingStore::with_placeholders(SensorKind::ALL),
        }
    }

    /// Wrap the dashboard for shared access.
    pub fn into_shared(self) -> SharedDashboard<H> {
        Mutex::new(RefCell::new(self))
    }

    /// Screen became active: bind every available channel.
    pub fn resume(&mut self) -> StartReport {
        info!("Dashboard resumed");
        self.binding.start(&mut self.hub, &mut self.store)
    }

    /// Screen became inactive: release every channel.
    pub fn pause(&mut self) {
        info!("Dashboard paused");
        self.binding.stop(&mut self.hub);
    }

    /// Pause and drop every notification still waiting in `queue`.
    ///
    /// Queued events belong to the released channels; a later resume may hand
    /// out the same channel ids for other kinds. Returns the number dropped.
    pub fn pause_discarding<const N: usize>(&mut self, queue: &EventQueue<N>) -> usize {
        self.pause();
        let mut dropped = 0;
        while queue.try_receive().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("Dropped {} stale notifications", dropped);
        }
        dropped
    }

    pub fn is_active(&self) -> bool {
        self.binding.is_active()
    }

    /// Apply one notification from the hub.
    pub fn dispatch(&mut self, event: &SensorEvent) -> DispatchOutcome {
        self.binding.dispatch(event, &mut self.store)
    }

    /// Apply every queued notification in arrival order.
    ///
    /// Returns the number of notifications that changed a row.
    pub fn drain<const N: usize>(&mut self, queue: &EventQueue<N>) -> usize {
        let mut updated = 0;
        while let Ok(event) = queue.try_receive() {
            if matches!(self.dispatch(&event), DispatchOutcome::Updated(_)) {
                updated += 1;
            }
        }
        updated
    }

    /// Update the permission state; it is consulted on the next resume.
    pub fn set_permissions(&mut self, permissions: Permissions) {
        self.binding.set_permissions(permissions);
    }

    pub fn permissions(&self) -> Permissions {
        self.binding.permissions()
    }

    pub fn store(&self) -> &ReadingStore {
        &self.store
    }

    pub fn binding(&self) -> &SensorBinding {
        &self.binding
    }

    pub fn hub(&self) -> &H {
        &self.hub
    }

    pub fn hub_mut(&mut self) -> &mut H {
        &mut self.hub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Permission;
    use crate::hub::{ChannelId, DeliveryRate};
    use crate::sensors::SENSOR_KIND_COUNT;
    use crate::store::PLACEHOLDER;
    use crate::testing::FakeHub;

    fn heart_rate(hub: &FakeHub, bpm: f32) -> SensorEvent {
        SensorEvent::reading(hub.channel_of(SensorKind::HeartRate).unwrap(), &[bpm])
    }

    #[test]
    fn test_new_seeds_placeholders_without_binding() {
        let dashboard = SensorDashboard::new(FakeHub::full(), DashConfig::default());

        assert!(!dashboard.is_active());
        assert_eq!(dashboard.store().len(), SENSOR_KIND_COUNT);
        assert!(dashboard.hub().subscribed().is_empty());
    }

    #[test]
    fn test_pause_keeps_values_and_ignores_late_events() {
        let mut dashboard = SensorDashboard::new(FakeHub::full(), DashConfig::default());
        dashboard.resume();

        let event = heart_rate(dashboard.hub(), 71.0);
        dashboard.dispatch(&event);
        dashboard.pause();

        let late = heart_rate(dashboard.hub(), 90.0);
        assert_eq!(dashboard.dispatch(&late), DispatchOutcome::Ignored);
        assert_eq!(dashboard.store().get("Heart Rate"), Some("71 bpm"));
        assert!(dashboard.hub().subscribed().is_empty());
    }

    #[test]
    fn test_resume_rebinds_channels() {
        let mut dashboard = SensorDashboard::new(FakeHub::full(), DashConfig::default());
        dashboard.resume();
        dashboard.pause();
        let report = dashboard.resume();

        assert_eq!(report.bound_count(), SENSOR_KIND_COUNT);
        assert_eq!(dashboard.hub().acquired(SensorKind::Barometer), 2);

        let event = heart_rate(dashboard.hub(), 58.0);
        assert_eq!(
            dashboard.dispatch(&event),
            DispatchOutcome::Updated(SensorKind::HeartRate)
        );
    }

    #[test]
    fn test_permission_grant_applies_on_next_resume() {
        let config = DashConfig {
            permissions: Permissions::none_granted(),
            ..DashConfig::default()
        };
        let mut dashboard = SensorDashboard::new(FakeHub::full(), config);

        let report = dashboard.resume();
        assert_eq!(report.bound_count(), SENSOR_KIND_COUNT - 2);
        assert_eq!(dashboard.store().get("Step Counter"), Some(PLACEHOLDER));

        let mut granted = dashboard.permissions();
        granted.set(Permission::ActivityRecognition, true);
        dashboard.set_permissions(granted);
        dashboard.pause();
        let report = dashboard.resume();

        assert!(matches!(
            report.outcome(SensorKind::StepCounter),
            Some(Ok(ChannelId(19)))
        ));
        assert!(report.outcome(SensorKind::HeartRate).unwrap().is_err());
    }

    #[test]
    fn test_drain_applies_queue_in_order() {
        let mut dashboard = SensorDashboard::new(FakeHub::full(), DashConfig::default());
        dashboard.resume();

        let queue = EventQueue::<8>::new();
        for bpm in [60.0, f32::NAN, 62.0, 62.4] {
            queue.try_send(heart_rate(dashboard.hub(), bpm)).unwrap();
        }
        queue
            .try_send(SensorEvent::reading(ChannelId(404), &[1.0]))
            .unwrap();

        // 60 -> update, NaN -> suppressed, 62 -> update, 62.4 -> unchanged
        assert_eq!(dashboard.drain(&queue), 2);
        assert_eq!(dashboard.store().get("Heart Rate"), Some("62 bpm"));
        assert!(queue.try_receive().is_err());
    }

    #[test]
    fn test_pause_discards_queued_events() {
        let mut dashboard = SensorDashboard::new(FakeHub::full(), DashConfig::default());
        dashboard.resume();

        let barometer = dashboard.hub().channel_of(SensorKind::Barometer).unwrap();
        let queue = EventQueue::<4>::new();
        queue
            .try_send(SensorEvent::reading(barometer, &[1013.7]))
            .unwrap();
        queue.try_send(heart_rate(dashboard.hub(), 75.0)).unwrap();

        assert_eq!(dashboard.pause_discarding(&queue), 2);
        dashboard.resume();

        assert_eq!(dashboard.drain(&queue), 0);
        assert_eq!(dashboard.store().get("Barometer"), Some(PLACEHOLDER));
        assert_eq!(dashboard.store().get("Heart Rate"), Some(PLACEHOLDER));
    }

    #[test]
    fn test_binding_exposes_configured_rate() {
        let config = DashConfig {
            rate: DeliveryRate::Game,
            ..DashConfig::default()
        };
        let mut dashboard = SensorDashboard::new(FakeHub::full(), config);
        dashboard.resume();

        assert_eq!(dashboard.binding().rate(), DeliveryRate::Game);
        assert_eq!(
            dashboard.hub().rate_of(SensorKind::Accelerometer),
            Some(DeliveryRate::Game)
        );
    }

    #[test]
    fn test_shared_dashboard() {
        let mut dashboard = SensorDashboard::new(FakeHub::full(), DashConfig::default());
        dashboard.resume();
        let event = heart_rate(dashboard.hub(), 80.0);
        let shared = dashboard.into_shared();

        shared.lock(|cell| {
            cell.borrow_mut().dispatch(&event);
        });

        let value = shared.lock(|cell| {
            cell.borrow()
                .store()
                .get("Heart Rate")
                .map(alloc::string::ToString::to_string)
        });
        assert_eq!(value.as_deref(), Some("80 bpm"));
    }
}
