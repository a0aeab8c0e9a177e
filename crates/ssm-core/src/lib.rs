//! Core domain logic for service state metrics.
//!
//! This crate contains:
//! - Slots: named, multiplier-scaled ranges of elapsed seconds
//! - The slotter: an ordered slot registry with first-match classification
//! - Beyond counts: per-kind cumulative counts of items in larger slots
//! - Elapsed-time derivation from last-known-good timestamps
//! - The time-slot document that defines a registry

pub mod beyond;
pub mod duration;
mod slot;
mod slotter;
pub mod time_slots;

pub use beyond::{BeyondCount, beyond_counts};
pub use duration::{ElapsedItem, derive_elapsed, humanize_duration, slot_elapsed};
pub use slot::{RawBound, Slot};
pub use slotter::{SlotError, SlotSummary, Slotter, SlotterDump};
pub use time_slots::{KindSlots, TimeSlots, TimeSlotsError};
