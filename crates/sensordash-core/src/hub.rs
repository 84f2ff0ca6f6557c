//! Hardware sensor hub abstraction and notification types
//!
//! The host platform implements [`SensorHub`] on top of its sensor service.
//! Notifications travel back as [`SensorEvent`]s, either handed straight to
//! [`SensorDashboard::dispatch`](crate::dashboard::SensorDashboard::dispatch)
//! or queued through an [`EventQueue`] when the platform delivers them from
//! another thread.

use core::fmt::Debug;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use serde::{Deserialize, Serialize};

use crate::sensors::SensorKind;

/// Maximum number of raw components kept per notification.
///
/// Vector sensors use three; some platforms append uncalibrated or
/// bias components, which are dropped beyond this capacity.
pub const MAX_EVENT_VALUES: usize = 6;

/// Queue depth for cross-thread delivery.
/// Sized to absorb one burst from every channel without blocking the producer.
pub const EVENT_QUEUE_CAPACITY: usize = 16;

/// Single-writer queue between a delivering thread and the dashboard.
pub type EventQueue<const N: usize = EVENT_QUEUE_CAPACITY> =
    Channel<CriticalSectionRawMutex, SensorEvent, N>;

/// Opaque identifier of an acquired hardware channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

/// Notification frequency tier requested when subscribing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryRate {
    /// As fast as the hardware allows
    Fastest,
    /// Suitable for games
    Game,
    /// Suitable for on-screen display
    #[default]
    Ui,
    /// Suitable for orientation changes
    Normal,
}

impl DeliveryRate {
    /// Nominal period between notifications, in microseconds.
    pub const fn period_micros(self) -> u32 {
        match self {
            Self::Fastest => 0,
            Self::Game => 20_000,
            Self::Ui => 66_667,
            Self::Normal => 200_000,
        }
    }
}

/// Accuracy status reported by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Unreliable,
    Low,
    Medium,
    High,
    /// The sensor lost contact with the body (heart rate)
    NoContact,
}

/// A notification delivered by the hub.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    /// New raw values for a channel
    Reading {
        channel: ChannelId,
        values: heapless::Vec<f32, MAX_EVENT_VALUES>,
    },
    /// The channel's accuracy changed
    Accuracy {
        channel: ChannelId,
        accuracy: Accuracy,
    },
}

impl SensorEvent {
    /// Build a reading event, keeping at most [`MAX_EVENT_VALUES`] components.
    pub fn reading(channel: ChannelId, raw: &[f32]) -> Self {
        let mut values = heapless::Vec::new();
        for value in raw.iter().take(MAX_EVENT_VALUES) {
            // Cannot fail: the iterator is bounded by the capacity.
            let _ = values.push(*value);
        }
        Self::Reading { channel, values }
    }

    pub const fn accuracy(channel: ChannelId, accuracy: Accuracy) -> Self {
        Self::Accuracy { channel, accuracy }
    }

    pub const fn channel(&self) -> ChannelId {
        match self {
            Self::Reading { channel, .. } | Self::Accuracy { channel, .. } => *channel,
        }
    }
}

/// Capability the platform provides for hardware sensor access.
pub trait SensorHub {
    type Error: Debug;

    /// Look up the default hardware channel for a kind.
    ///
    /// Returns `None` when the device has no such sensor or the platform
    /// refuses access.
    fn acquire(&mut self, kind: SensorKind) -> Option<ChannelId>;

    /// Start delivering notifications for an acquired channel.
    fn subscribe(&mut self, channel: ChannelId, rate: DeliveryRate) -> Result<(), Self::Error>;

    /// Stop delivering notifications for a channel.
    fn unsubscribe(&mut self, channel: ChannelId);
}

impl<H: SensorHub + ?Sized> SensorHub for &mut H {
    type Error = H::Error;

    fn acquire(&mut self, kind: SensorKind) -> Option<ChannelId> {
        (**self).acquire(kind)
    }

    fn subscribe(&mut self, channel: ChannelId, rate: DeliveryRate) -> Result<(), Self::Error> {
        (**self).subscribe(channel, rate)
    }

    fn unsubscribe(&mut self, channel: ChannelId) {
        (**self).unsubscribe(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_drops_extra_components() {
        let raw = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let event = SensorEvent::reading(ChannelId(4), &raw);

        match event {
            SensorEvent::Reading { channel, values } => {
                assert_eq!(channel, ChannelId(4));
                assert_eq!(values.len(), MAX_EVENT_VALUES);
                assert_eq!(values[5], 6.0);
            }
            SensorEvent::Accuracy { .. } => panic!("expected a reading"),
        }
    }

    #[test]
    fn test_ui_rate_is_default() {
        assert_eq!(DeliveryRate::default(), DeliveryRate::Ui);
        assert!(DeliveryRate::Ui.period_micros() > DeliveryRate::Game.period_micros());
        assert!(DeliveryRate::Ui.period_micros() < DeliveryRate::Normal.period_micros());
    }

    #[test]
    fn test_event_queue_is_fifo() {
        let queue = EventQueue::<4>::new();
        queue
            .try_send(SensorEvent::reading(ChannelId(1), &[1.0]))
            .unwrap();
        queue
            .try_send(SensorEvent::accuracy(ChannelId(2), Accuracy::High))
            .unwrap();

        assert_eq!(queue.try_receive().unwrap().channel(), ChannelId(1));
        assert_eq!(queue.try_receive().unwrap().channel(), ChannelId(2));
        assert!(queue.try_receive().is_err());
    }
}
