//! Time-slot definition document.
//!
//! The document is a JSON object keyed by kind, in the order slots should be
//! reported:
//!
//! ```json
//! {
//!   "hours": { "multiplier": 3600, "slots": [[0, 1], [1, 2], [2, 24]] },
//!   "days":  { "multiplier": 86400, "slots": [[1, 2], [2, 7]] }
//! }
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slot::RawBound;
use crate::slotter::{SlotError, Slotter};

/// Errors raised while loading a time-slot document.
#[derive(Debug, Error)]
pub enum TimeSlotsError {
    /// The document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON of the expected shape.
    #[error("invalid time-slot document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A multiplier is zero, negative, or not finite.
    #[error("kind {kind}: multiplier must be a positive number, got {multiplier}")]
    InvalidMultiplier { kind: String, multiplier: f64 },

    /// A slot's bounds are negative, not finite, or reversed.
    #[error("kind {kind}: invalid slot [{start}, {end}]: {reason}")]
    InvalidSlot {
        kind: String,
        start: f64,
        end: f64,
        reason: &'static str,
    },

    /// Two slots share a label.
    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Slots for one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSlots {
    /// Converts raw bounds into seconds (e.g. 3600 for hours).
    pub multiplier: f64,
    /// `[start, end]` pairs in raw units, as written.
    pub slots: Vec<(RawBound, RawBound)>,
}

/// Parsed time-slot document, kinds in document order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlots {
    pub kinds: IndexMap<String, KindSlots>,
}

impl TimeSlots {
    /// Reads and parses the document at `path`.
    pub fn load(path: &Path) -> Result<Self, TimeSlotsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TimeSlotsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, TimeSlotsError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Checks every multiplier and slot bound.
    pub fn validate(&self) -> Result<(), TimeSlotsError> {
        for (kind, def) in &self.kinds {
            if !def.multiplier.is_finite() || def.multiplier <= 0.0 {
                return Err(TimeSlotsError::InvalidMultiplier {
                    kind: kind.clone(),
                    multiplier: def.multiplier,
                });
            }
            for (start, end) in &def.slots {
                let (start, end) = (start.value(), end.value());
                let reason = if !start.is_finite() || !end.is_finite() {
                    Some("bounds must be finite")
                } else if start < 0.0 {
                    Some("bounds must not be negative")
                } else if start > end {
                    Some("start must not exceed end")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(TimeSlotsError::InvalidSlot {
                        kind: kind.clone(),
                        start,
                        end,
                        reason,
                    });
                }
            }
        }
        Ok(())
    }

    /// Builds an empty registry with one slot per `[start, end]` pair,
    /// defined in document order.
    pub fn to_slotter<P>(&self) -> Result<Slotter<P>, TimeSlotsError> {
        self.validate()?;

        let mut slotter = Slotter::new();
        for (kind, def) in &self.kinds {
            for (start, end) in &def.slots {
                slotter.define_slot(start.clone(), end.clone(), kind, def.multiplier)?;
            }
        }
        Ok(slotter)
    }
}
