//! Slot definitions: named, scaled, half-open ranges of elapsed seconds.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One raw slot bound: its numeric value and the text it was written as.
///
/// Labels are built from the text, so a document bound of `1.0` labels its
/// slot `1.0-…` while the value still compares equal to `1`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBound {
    value: f64,
    text: String,
}

impl RawBound {
    pub fn new(value: f64, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }

    pub const fn value(&self) -> f64 {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<f64> for RawBound {
    fn from(value: f64) -> Self {
        Self::new(value, value.to_string())
    }
}

impl From<serde_json::Number> for RawBound {
    fn from(number: serde_json::Number) -> Self {
        // Only arbitrary-precision numbers lack an f64 view; NaN fails validation.
        let value = number.as_f64().unwrap_or(f64::NAN);
        Self::new(value, number.to_string())
    }
}

impl fmt::Display for RawBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for RawBound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.value)
    }
}

impl<'de> Deserialize<'de> for RawBound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Number::deserialize(deserializer).map(Self::from)
    }
}

/// A half-open range `[range_start, range_end)` of elapsed seconds.
///
/// Slots keep the raw bounds exactly as authored in the time-slot document
/// alongside the multiplier-scaled bounds used for classification. The label
/// is derived from the raw bounds and the kind, and is the slot's identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    kind: String,
    raw_start: RawBound,
    raw_end: RawBound,
    range_start: f64,
    range_end: f64,
    label: String,
}

impl Slot {
    /// Creates a slot, scaling the raw bounds by `multiplier`.
    pub fn new(
        raw_start: impl Into<RawBound>,
        raw_end: impl Into<RawBound>,
        kind: impl Into<String>,
        multiplier: f64,
    ) -> Self {
        let (raw_start, raw_end) = (raw_start.into(), raw_end.into());
        let kind = kind.into();
        let label = format!("{raw_start}-{raw_end} {kind}");
        Self {
            range_start: raw_start.value() * multiplier,
            range_end: raw_end.value() * multiplier,
            raw_start,
            raw_end,
            kind,
            label,
        }
    }

    /// The category this slot belongs to (e.g. "hours", "days").
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Display identity, `"{raw_start}-{raw_end} {kind}"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The unscaled bounds rendered as `"{raw_start}-{raw_end}"`.
    pub fn raw_range(&self) -> String {
        format!("{}-{}", self.raw_start, self.raw_end)
    }

    pub const fn raw_start(&self) -> f64 {
        self.raw_start.value()
    }

    pub const fn raw_end(&self) -> f64 {
        self.raw_end.value()
    }

    /// Scaled lower bound (inclusive), in seconds.
    pub const fn range_start(&self) -> f64 {
        self.range_start
    }

    /// Scaled upper bound (exclusive), in seconds.
    pub const fn range_end(&self) -> f64 {
        self.range_end
    }

    /// Returns true if `value` lies in `[range_start, range_end)`.
    ///
    /// NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        self.range_start <= value && value < self.range_end
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
