//! Cumulative "beyond" counts derived from a populated [`Slotter`].
//!
//! Nothing here is stored in the registry; the series is recomputed from
//! [`Slotter::iter`] every time it is asked for.

use std::collections::HashMap;

use crate::slot::Slot;
use crate::slotter::Slotter;

/// Number of items in larger slots of the same kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeyondCount<'a> {
    pub slot: &'a Slot,
    pub count: usize,
}

/// Walks slots in reverse insertion order, keeping one running total per kind.
///
/// Each slot reports the total accumulated before its own items are added, so
/// the last-inserted slot of every kind reports zero. With ascending,
/// contiguous slots per kind this is the number of items beyond the slot's
/// upper bound. Malformed layouts still produce a result, just not a
/// meaningful one.
pub fn beyond_counts<P>(slotter: &Slotter<P>) -> Vec<BeyondCount<'_>> {
    let mut running: HashMap<&str, usize> = HashMap::new();
    slotter
        .iter()
        .rev()
        .map(|(slot, items)| {
            let total = running.entry(slot.kind()).or_insert(0);
            let count = *total;
            *total += items.len();
            BeyondCount { slot, count }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn labelled(counts: &[BeyondCount<'_>]) -> Vec<(String, usize)> {
        counts
            .iter()
            .map(|c| (c.slot.label().to_string(), c.count))
            .collect()
    }

    #[test]
    fn hours_scenario() {
        let mut slotter = Slotter::new();
        slotter.define_slot(0.0, 1.0, "hours", 3600.0).unwrap();
        slotter.define_slot(1.0, 2.0, "hours", 3600.0).unwrap();
        slotter.classify(1800.0, "a");
        slotter.classify(5400.0, "b");

        assert_eq!(
            labelled(&beyond_counts(&slotter)),
            vec![("1-2 hours".to_string(), 0), ("0-1 hours".to_string(), 1)]
        );

        // A dropped value changes nothing.
        slotter.classify(10_000.0, "c");
        assert_eq!(
            labelled(&beyond_counts(&slotter)),
            vec![("1-2 hours".to_string(), 0), ("0-1 hours".to_string(), 1)]
        );
    }

    #[test]
    fn kinds_accumulate_independently() {
        let mut slotter = Slotter::new();
        slotter.define_slot(0.0, 1.0, "hours", 3600.0).unwrap();
        slotter.define_slot(1.0, 24.0, "hours", 3600.0).unwrap();
        slotter.define_slot(1.0, 2.0, "days", 86_400.0).unwrap();
        slotter.define_slot(2.0, 7.0, "days", 86_400.0).unwrap();

        slotter.classify(7200.0, "two hours");
        slotter.classify(100_000.0, "a day and a bit");
        slotter.classify(200_000.0, "two days");
        slotter.classify(300_000.0, "three days");

        assert_eq!(
            labelled(&beyond_counts(&slotter)),
            vec![
                ("2-7 days".to_string(), 0),
                ("1-2 days".to_string(), 2),
                ("1-24 hours".to_string(), 0),
                ("0-1 hours".to_string(), 1),
            ]
        );
    }

    #[test]
    fn counts_compare_by_slot_and_total() {
        let mut slotter = Slotter::new();
        slotter.define_slot(0.0, 0.5, "hours", 3600.0).unwrap();
        slotter.define_slot(0.5, 1.0, "hours", 3600.0).unwrap();
        slotter.classify(2700.0, "late");

        let counts = beyond_counts(&slotter);
        let first = slotter.slot("0-0.5 hours").unwrap();
        let second = slotter.slot("0.5-1 hours").unwrap();
        assert_eq!(
            counts,
            vec![
                BeyondCount { slot: second, count: 0 },
                BeyondCount { slot: first, count: 1 },
            ]
        );
        assert_ne!(counts[0], counts[1]);
    }

    #[test]
    fn empty_registry_yields_nothing() {
        let slotter: Slotter<()> = Slotter::new();
        assert!(beyond_counts(&slotter).is_empty());
    }

    #[test]
    fn unpopulated_slots_are_all_zero() {
        let mut slotter: Slotter<()> = Slotter::new();
        slotter.define_slot(0.0, 1.0, "hours", 3600.0).unwrap();
        slotter.define_slot(1.0, 2.0, "hours", 3600.0).unwrap();
        assert!(beyond_counts(&slotter).iter().all(|c| c.count == 0));
    }

    proptest! {
        #[test]
        fn beyond_is_monotonic_for_contiguous_slots(
            widths in prop::collection::vec(1u32..50, 1..8),
            values in prop::collection::vec(0u32..500, 0..64),
        ) {
            let mut slotter = Slotter::new();
            let mut start = 0u32;
            for width in &widths {
                slotter
                    .define_slot(f64::from(start), f64::from(start + width), "units", 1.0)
                    .unwrap();
                start += width;
            }
            let upper = start;
            for value in &values {
                slotter.classify(f64::from(*value), *value);
            }

            let counts = beyond_counts(&slotter);
            prop_assert_eq!(counts[0].count, 0);
            for pair in counts.windows(2) {
                prop_assert!(pair[0].count <= pair[1].count);
            }

            // Every beyond count equals the number of values past the slot.
            for count in &counts {
                let expected = values
                    .iter()
                    .filter(|v| f64::from(**v) >= count.slot.range_end() && **v < upper)
                    .count();
                prop_assert_eq!(count.count, expected);
            }
        }

        #[test]
        fn value_lands_in_exactly_one_slot(value in 0u32..300) {
            let mut slotter = Slotter::new();
            for start in (0..300).step_by(30) {
                slotter
                    .define_slot(f64::from(start), f64::from(start + 30), "units", 1.0)
                    .unwrap();
            }
            slotter.classify(f64::from(value), value);

            let holders: Vec<_> = slotter
                .iter()
                .filter(|(_, items)| items.contains(&value))
                .map(|(slot, _)| slot.clone())
                .collect();
            prop_assert_eq!(holders.len(), 1);
            prop_assert!(holders[0].contains(f64::from(value)));
        }

        #[test]
        fn out_of_range_values_are_invisible(value in 300u32..10_000) {
            let mut slotter = Slotter::new();
            slotter.define_slot(0.0, 100.0, "units", 1.0).unwrap();
            slotter.define_slot(100.0, 300.0, "units", 1.0).unwrap();
            prop_assert!(slotter.classify(f64::from(value), value).is_none());
            prop_assert_eq!(slotter.item_count(), 0);
            prop_assert!(beyond_counts(&slotter).iter().all(|c| c.count == 0));
        }
    }
}
