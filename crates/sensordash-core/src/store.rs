//! Ordered store of the latest formatted reading per sensor
//!
//! Rows keep their insertion order, which is also the display order. A side
//! index maps names to row positions so an upsert never scans the list.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::Serialize;

use crate::sensors::SensorKind;

/// Value shown until a real reading arrives.
pub const PLACEHOLDER: &str = "—";

/// One line of display state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub name: String,
    pub value: String,
}

impl Row {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value == PLACEHOLDER
    }
}

/// Latest formatted reading for every named sensor.
///
/// `revision` moves forward only when an upsert actually changes a row or
/// appends one, so observers can poll it to decide whether to redraw.
#[derive(Debug, Default, Clone)]
pub struct ReadingStore {
    rows: Vec<Row>,
    index: BTreeMap<String, usize>,
    revision: u32,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one placeholder row per kind, in the given order.
    pub fn with_placeholders(kinds: impl IntoIterator<Item = SensorKind>) -> Self {
        let mut store = Self::new();
        for kind in kinds {
            store.upsert(kind.name(), PLACEHOLDER);
        }
        store
    }

    /// Replace the value of the row called `name`, or append a new row.
    ///
    /// Returns `true` when the store changed. Repeating an identical upsert is a
    /// no-op and leaves the revision untouched.
    pub fn upsert(&mut self, name: &str, value: &str) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                let row = &mut self.rows[i];
                if row.value == value {
                    return false;
                }
                row.value.clear();
                row.value.push_str(value);
            }
            None => {
                self.index.insert(name.to_string(), self.rows.len());
                self.rows.push(Row::new(name, value));
            }
        }
        self.revision = self.revision.wrapping_add(1);
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.rows[i].value.as_str())
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }
}

impl<'a> IntoIterator for &'a ReadingStore {
    type Item = &'a Row;
    type IntoIter = core::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
