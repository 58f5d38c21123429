//! Per-user category affinity
//!
//! Affinity is a normalised interest profile over product categories. The
//! strongest category always lands on exactly 1.0, which makes the values
//! comparable across users with very different activity levels.

use std::collections::HashMap;

use crate::interactions::AffinitySignal;

/// Normalised per-category affinity in [0, 1]
///
/// Applies the affinity weighting policy to each signal, sums per category
/// and divides by the maximum total. Users without signals get an empty map.
pub fn category_affinity(signals: &[AffinitySignal]) -> HashMap<i64, f64> {
    let mut totals: HashMap<i64, f64> = HashMap::new();
    for signal in signals {
        *totals.entry(signal.category_id).or_insert(0.0) +=
            signal.kind.affinity_weight(signal.quantity);
    }

    let max = totals.values().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return HashMap::new();
    }

    totals
        .into_iter()
        .map(|(category_id, total)| (category_id, total / max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactions::EventKind;

    fn signal(category_id: i64, kind: EventKind, quantity: i64) -> AffinitySignal {
        AffinitySignal {
            category_id,
            kind,
            quantity,
        }
    }

    #[test]
    fn test_single_category_normalises_to_one() {
        let affinity = category_affinity(&[
            signal(7, EventKind::View, 1),
            signal(7, EventKind::Purchase, 2),
        ]);

        assert_eq!(affinity.len(), 1);
        assert_eq!(affinity[&7], 1.0);
    }

    #[test]
    fn test_strongest_category_is_exactly_one() {
        let affinity = category_affinity(&[
            signal(1, EventKind::View, 1),
            signal(2, EventKind::Purchase, 3),
            signal(2, EventKind::View, 1),
        ]);

        // Category 2 totals 7.0, category 1 totals 1.0.
        assert_eq!(affinity[&2], 1.0);
        assert!((affinity[&1] - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_purchases_outweigh_views() {
        let affinity = category_affinity(&[
            signal(1, EventKind::View, 1),
            signal(2, EventKind::Purchase, 1),
        ]);

        assert!(affinity[&2] > affinity[&1]);
        assert_eq!(affinity[&2], 1.0);
        assert_eq!(affinity[&1], 0.5);
    }

    #[test]
    fn test_no_signals_yields_empty_map() {
        assert!(category_affinity(&[]).is_empty());
    }
}
