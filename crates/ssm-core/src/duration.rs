//! Elapsed-time derivation from last-known-good timestamps.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use serde::Serialize;

use crate::slotter::Slotter;

/// Payload recorded for each classified entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElapsedItem {
    /// Entity identifier, e.g. `host!service`.
    pub name: String,
    /// Seconds since the entity was last known good.
    pub elapsed_secs: i64,
    /// Human-readable form of `elapsed_secs`.
    pub duration: String,
}

impl ElapsedItem {
    /// Splits `host!service` names. Names without `!` have an empty service.
    pub fn host_and_service(&self) -> (&str, &str) {
        self.name.split_once('!').unwrap_or((self.name.as_str(), ""))
    }
}

/// Pairs every entity with its elapsed seconds as of `now`.
///
/// Timestamps in the future (clock skew) clamp to zero elapsed seconds.
pub fn derive_elapsed(
    timestamps: &BTreeMap<String, i64>,
    now: i64,
) -> impl Iterator<Item = ElapsedItem> + '_ {
    timestamps.iter().map(move |(name, &timestamp)| {
        let elapsed_secs = now.saturating_sub(timestamp).max(0);
        ElapsedItem {
            name: name.clone(),
            elapsed_secs,
            duration: humanize_duration(elapsed_secs),
        }
    })
}

/// Classifies every entity of `timestamps` into `slotter`.
///
/// Returns how many entities matched a slot; the rest were dropped.
#[expect(
    clippy::cast_precision_loss,
    reason = "elapsed seconds stay far below 2^53"
)]
pub fn slot_elapsed(
    slotter: &mut Slotter<ElapsedItem>,
    timestamps: &BTreeMap<String, i64>,
    now: i64,
) -> usize {
    let mut matched = 0;
    for item in derive_elapsed(timestamps, now) {
        let value = item.elapsed_secs as f64;
        if slotter.classify(value, item).is_some() {
            matched += 1;
        }
    }
    matched
}

/// Formats seconds as `H:MM:SS`, prefixed with `N day(s), ` past one day.
///
/// Negative input is treated as zero.
pub fn humanize_duration(secs: i64) -> String {
    let delta = TimeDelta::try_seconds(secs.max(0)).unwrap_or(TimeDelta::MAX);
    let days = delta.num_days();
    let hours = delta.num_hours() % 24;
    let minutes = delta.num_minutes() % 60;
    let seconds = delta.num_seconds() % 60;

    let clock = format!("{hours}:{minutes:02}:{seconds:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours() -> Slotter<ElapsedItem> {
        let mut slotter = Slotter::new();
        slotter.define_slot(0.0, 1.0, "hours", 3600.0).unwrap();
        slotter.define_slot(1.0, 2.0, "hours", 3600.0).unwrap();
        slotter
    }

    #[test]
    fn humanize_matches_clock_format() {
        assert_eq!(humanize_duration(0), "0:00:00");
        assert_eq!(humanize_duration(59), "0:00:59");
        assert_eq!(humanize_duration(3661), "1:01:01");
        assert_eq!(humanize_duration(86_399), "23:59:59");
    }

    #[test]
    fn humanize_adds_days() {
        assert_eq!(humanize_duration(86_400), "1 day, 0:00:00");
        assert_eq!(humanize_duration(2 * 86_400 + 5), "2 days, 0:00:05");
    }

    #[test]
    fn humanize_clamps_negative() {
        assert_eq!(humanize_duration(-30), "0:00:00");
    }

    #[test]
    fn derive_elapsed_subtracts_from_now() {
        let timestamps = BTreeMap::from([
            ("web!http".to_string(), 1_000),
            ("db!disk".to_string(), 4_000),
        ]);
        let items: Vec<_> = derive_elapsed(&timestamps, 5_000).collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "db!disk");
        assert_eq!(items[0].elapsed_secs, 1_000);
        assert_eq!(items[0].duration, "0:16:40");
        assert_eq!(items[1].elapsed_secs, 4_000);
    }

    #[test]
    fn derive_elapsed_clamps_future_timestamps() {
        let timestamps = BTreeMap::from([("web!http".to_string(), 9_000)]);
        let items: Vec<_> = derive_elapsed(&timestamps, 5_000).collect();
        assert_eq!(items[0].elapsed_secs, 0);
    }

    #[test]
    fn host_and_service_split_on_first_bang() {
        let item = ElapsedItem {
            name: "web-1!check!extra".to_string(),
            elapsed_secs: 0,
            duration: String::new(),
        };
        assert_eq!(item.host_and_service(), ("web-1", "check!extra"));

        let bare = ElapsedItem {
            name: "standalone".to_string(),
            ..item
        };
        assert_eq!(bare.host_and_service(), ("standalone", ""));
    }

    #[test]
    fn slot_elapsed_populates_and_drops() {
        let now = 100_000;
        let timestamps = BTreeMap::from([
            ("a!half-hour".to_string(), now - 1_800),
            ("b!hour-and-half".to_string(), now - 5_400),
            ("c!too-old".to_string(), now - 10_000),
        ]);
        let mut slotter = hours();

        assert_eq!(slot_elapsed(&mut slotter, &timestamps, now), 2);

        let slots = slotter.slots().to_vec();
        assert_eq!(slotter.items_of(&slots[0])[0].name, "a!half-hour");
        assert_eq!(slotter.items_of(&slots[1])[0].duration, "1:30:00");
        assert_eq!(slotter.item_count(), 2);
    }

    #[test]
    fn empty_mapping_leaves_slots_empty() {
        let mut slotter = hours();
        assert_eq!(slot_elapsed(&mut slotter, &BTreeMap::new(), 0), 0);
        assert!(slotter.iter().all(|(_, items)| items.is_empty()));
    }
}
