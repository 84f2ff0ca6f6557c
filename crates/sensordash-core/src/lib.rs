//! Hardware-independent core library for sensordash
//!
//! This crate contains all platform-agnostic logic for the sensordash wearable
//! display: the reading store, the sensor binding layer with its per-kind
//! formatting policy, the dashboard lifecycle wrapper, and the list page that
//! presents the readings.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod binding;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod hub;
pub mod sensors;
pub mod store;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use binding::{BindOutcome, DispatchOutcome, SensorBinding, StartReport};
pub use config::{DashConfig, Permission, Permissions};
pub use dashboard::{SensorDashboard, SharedDashboard};
pub use error::{DashError, DashResult};
pub use hub::{
    Accuracy, ChannelId, DeliveryRate, EVENT_QUEUE_CAPACITY, EventQueue, MAX_EVENT_VALUES,
    SensorEvent, SensorHub,
};
pub use sensors::{SENSOR_KIND_COUNT, SensorKind};
pub use store::{PLACEHOLDER, ReadingStore, Row};
