//! Aggregate counts over a task's items.

use crate::inventory::{Condition, ScannedItem};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Label → count pairs kept in the order labels were first seen.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    fn bump(&mut self, label: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == label) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((label.to_string(), 1)),
        }
    }

    /// Count for a label, zero if it was never seen.
    pub fn get(&self, label: &str) -> usize {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Totals for a set of items, bucketed by condition, location and the way
/// each code was captured.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_items: usize,
    pub by_condition: Tally,
    pub by_location: Tally,
    pub scan_methods: Tally,
}

impl Summary {
    pub fn excellent(&self) -> usize {
        self.by_condition.get(Condition::Excellent.as_str())
    }

    /// Items rated Fair or Poor.
    pub fn needs_attention(&self) -> usize {
        self.by_condition.get(Condition::Fair.as_str()) + self.by_condition.get(Condition::Poor.as_str())
    }

    pub fn damaged(&self) -> usize {
        self.by_condition.get(Condition::Damaged.as_str())
    }
}

/// Count items by condition (`Unknown` when unset), location (`Unspecified`
/// when blank) and scan method.
///
pub fn summarize(items: &[ScannedItem]) -> Summary {
    let mut summary = Summary {
        total_items: items.len(),
        ..Default::default()
    };
    for item in items {
        summary
            .by_condition
            .bump(item.condition.map(|c| c.as_str()).unwrap_or("Unknown"));
        let location = if item.location.is_empty() {
            "Unspecified"
        } else {
            item.location.as_str()
        };
        summary.by_location.bump(location);
        summary.scan_methods.bump(item.scanned_data.scan_method());
    }
    summary
}
