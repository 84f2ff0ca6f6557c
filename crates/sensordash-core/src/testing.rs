//! In-memory sensor hub shared by the unit tests.

use alloc::vec::Vec;

use crate::hub::{ChannelId, DeliveryRate, SensorHub};
use crate::sensors::{SENSOR_KIND_COUNT, SensorKind};

/// Channel ids mirror common platform sensor type numbers.
const CHANNEL_IDS: [u32; SENSOR_KIND_COUNT] = [1, 4, 2, 6, 5, 19, 21];

pub(crate) struct FakeHub {
    present: [bool; SENSOR_KIND_COUNT],
    failing: [bool; SENSOR_KIND_COUNT],
    acquired: [u32; SENSOR_KIND_COUNT],
    subscribed: Vec<(ChannelId, DeliveryRate)>,
}

impl FakeHub {
    pub(crate) fn full() -> Self {
        Self {
            present: [true; SENSOR_KIND_COUNT],
            failing: [false; SENSOR_KIND_COUNT],
            acquired: [0; SENSOR_KIND_COUNT],
            subscribed: Vec::new(),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            present: [false; SENSOR_KIND_COUNT],
            ..Self::full()
        }
    }

    pub(crate) fn without(mut self, kind: SensorKind) -> Self {
        self.present[kind.index()] = false;
        self
    }

    pub(crate) fn failing_subscribe(mut self, kind: SensorKind) -> Self {
        self.failing[kind.index()] = true;
        self
    }

    pub(crate) fn channel_of(&self, kind: SensorKind) -> Option<ChannelId> {
        self.present[kind.index()].then_some(ChannelId(CHANNEL_IDS[kind.index()]))
    }

    pub(crate) fn acquired(&self, kind: SensorKind) -> u32 {
        self.acquired[kind.index()]
    }

    pub(crate) fn subscribed(&self) -> &[(ChannelId, DeliveryRate)] {
        &self.subscribed
    }

    pub(crate) fn rate_of(&self, kind: SensorKind) -> Option<DeliveryRate> {
        let channel = ChannelId(CHANNEL_IDS[kind.index()]);
        self.subscribed
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, rate)| *rate)
    }

    fn kind_of(channel: ChannelId) -> Option<SensorKind> {
        CHANNEL_IDS
            .iter()
            .position(|&id| id == channel.0)
            .map(|i| SensorKind::ALL[i])
    }
}

impl SensorHub for FakeHub {
    type Error = &'static str;

    fn acquire(&mut self, kind: SensorKind) -> Option<ChannelId> {
        self.acquired[kind.index()] += 1;
        self.channel_of(kind)
    }

    fn subscribe(&mut self, channel: ChannelId, rate: DeliveryRate) -> Result<(), Self::Error> {
        match Self::kind_of(channel) {
            Some(kind) if self.failing[kind.index()] => Err("listener rejected"),
            Some(_) => {
                self.subscribed.retain(|(c, _)| *c != channel);
                self.subscribed.push((channel, rate));
                Ok(())
            }
            None => Err("no such channel"),
        }
    }

    fn unsubscribe(&mut self, channel: ChannelId) {
        self.subscribed.retain(|(c, _)| *c != channel);
    }
}
