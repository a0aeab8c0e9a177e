//! Slot registry and first-match classification.
//!
//! A [`Slotter`] is built once per run, populated with one batch of items, then
//! only read by renderers. Slots are kept in insertion order, which is also
//! the iteration order of every query.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::slot::{RawBound, Slot};

/// Errors raised while defining slots.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Two slots produced the same `"{start}-{end} {kind}"` label.
    #[error("duplicate slot label: {label}")]
    DuplicateSlotLabel { label: String },
}

/// Ordered set of slots with the items classified into each.
#[derive(Debug, Clone)]
pub struct Slotter<P> {
    slots: Vec<Slot>,
    /// Items per slot, indexed like `slots`.
    items: Vec<Vec<P>>,
    by_label: HashMap<String, usize>,
}

impl<P> Default for Slotter<P> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            items: Vec::new(),
            by_label: HashMap::new(),
        }
    }
}

impl<P> Slotter<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a slot covering `[raw_start * multiplier, raw_end * multiplier)`.
    ///
    /// Fails without modifying the registry if the derived label already exists.
    pub fn define_slot(
        &mut self,
        raw_start: impl Into<RawBound>,
        raw_end: impl Into<RawBound>,
        kind: &str,
        multiplier: f64,
    ) -> Result<&Slot, SlotError> {
        let slot = Slot::new(raw_start, raw_end, kind, multiplier);
        if self.by_label.contains_key(slot.label()) {
            return Err(SlotError::DuplicateSlotLabel {
                label: slot.label().to_string(),
            });
        }

        let index = self.slots.len();
        self.by_label.insert(slot.label().to_string(), index);
        self.slots.push(slot);
        self.items.push(Vec::new());
        Ok(&self.slots[index])
    }

    /// All slots in insertion order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Looks up a slot by its label.
    pub fn slot(&self, label: &str) -> Option<&Slot> {
        self.by_label.get(label).map(|&index| &self.slots[index])
    }

    /// Records `payload` in the first slot (in insertion order) containing `value`.
    ///
    /// A value outside every slot is dropped and `None` is returned. This is
    /// not an error.
    pub fn classify(&mut self, value: f64, payload: P) -> Option<&Slot> {
        let index = self.slots.iter().position(|slot| slot.contains(value))?;
        self.items[index].push(payload);
        Some(&self.slots[index])
    }

    /// Items classified into `slot`, in insertion order.
    ///
    /// Returns an empty slice for a slot this registry does not know.
    pub fn items_of(&self, slot: &Slot) -> &[P] {
        self.by_label
            .get(slot.label())
            .map(|&index| self.items[index].as_slice())
            .unwrap_or(&[])
    }

    /// Iterates `(slot, items)` pairs in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Slot, &[P])> {
        self.slots
            .iter()
            .zip(self.items.iter().map(Vec::as_slice))
    }

    /// Total number of classified items across all slots.
    pub fn item_count(&self) -> usize {
        self.items.iter().map(Vec::len).sum()
    }

    /// Serializable snapshot of the registry for diagnostics.
    pub fn dump(&self) -> SlotterDump {
        SlotterDump {
            slots: self
                .iter()
                .map(|(slot, items)| SlotSummary {
                    label: slot.label().to_string(),
                    kind: slot.kind().to_string(),
                    range_start: slot.range_start(),
                    range_end: slot.range_end(),
                    items: items.len(),
                })
                .collect(),
        }
    }
}

/// Diagnostic view of a [`Slotter`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotterDump {
    pub slots: Vec<SlotSummary>,
}

/// One slot in a [`SlotterDump`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    pub label: String,
    pub kind: String,
    pub range_start: f64,
    pub range_end: f64,
    pub items: usize,
}
