use crate::common::ObjectIdx;

use anyhow::ensure;
use itertools::Itertools;
use std::collections::HashSet;

/// Largest novelty order a table can be configured for.
pub const MAX_NOVELTY_WIDTH: usize = 4;

/// `(feature position, feature value)`.
pub type FeatureValue = (usize, ObjectIdx);

/// Seen feature-valuation tuples, one append-only set per order `1..=max_width`.
///
/// Only orders up to the active bound are queried and updated; the bound
/// starts at `max_width` and can be lowered per run with [`set_bound`].
///
/// [`set_bound`]: NoveltyTable::set_bound
#[derive(Debug, Clone)]
pub struct NoveltyTable {
    max_width: usize,
    bound: usize,
    seen: Vec<HashSet<Vec<FeatureValue>>>,
}

impl NoveltyTable {
    pub fn new(max_width: usize) -> anyhow::Result<Self> {
        ensure!(
            (1..=MAX_NOVELTY_WIDTH).contains(&max_width),
            "novelty width must be between 1 and {MAX_NOVELTY_WIDTH}, got {max_width}"
        );
        Ok(NoveltyTable {
            max_width,
            bound: max_width,
            seen: vec![HashSet::new(); max_width],
        })
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    pub fn set_bound(&mut self, bound: usize) -> anyhow::Result<()> {
        ensure!(
            (1..=self.max_width).contains(&bound),
            "novelty order {bound} requested from a table configured up to {}",
            self.max_width
        );
        self.bound = bound;
        Ok(())
    }

    /// Smallest `k <= bound` for which `features` holds an unseen k-tuple, or
    /// `bound + 1`. Every k-tuple up to the bound is marked seen on the way.
    pub fn evaluate(&mut self, features: &[ObjectIdx]) -> usize {
        let mut novelty = self.bound + 1;
        for k in 1..=self.bound {
            let table = &mut self.seen[k - 1];
            let mut novel = false;
            for positions in (0..features.len()).combinations(k) {
                let tuple: Vec<FeatureValue> = positions
                    .into_iter()
                    .map(|position| (position, features[position]))
                    .collect();
                novel |= table.insert(tuple);
            }
            if novel && k < novelty {
                novelty = k;
            }
        }
        novelty
    }

    pub fn is_seen(&self, tuple: &[FeatureValue]) -> bool {
        tuple.len() <= self.max_width
            && !tuple.is_empty()
            && self.seen[tuple.len() - 1].contains(tuple)
    }

    /// Number of tuples recorded at order `k`.
    pub fn len(&self, k: usize) -> usize {
        self.seen.get(k.wrapping_sub(1)).map_or(0, HashSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.seen.iter().all(HashSet::is_empty)
    }

    pub fn reset(&mut self) {
        for table in &mut self.seen {
            table.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_novelty_orders() {
        let mut table = NoveltyTable::new(2).unwrap();
        assert_eq!(table.evaluate(&[0, 0]), 1);
        assert_eq!(table.evaluate(&[1, 0]), 1);
        assert_eq!(table.evaluate(&[0, 1]), 1);
        // Every single value is known, but the pair (1, 1) is not.
        assert_eq!(table.evaluate(&[1, 1]), 2);
        assert_eq!(table.evaluate(&[1, 1]), 3);
    }

    #[test]
    fn test_smaller_order_still_updates_larger_tables() {
        let mut table = NoveltyTable::new(2).unwrap();
        assert_eq!(table.evaluate(&[0, 0]), 1);
        assert!(table.is_seen(&[(0, 0), (1, 0)]));
        assert_eq!(table.len(1), 2);
        assert_eq!(table.len(2), 1);
    }

    #[test]
    fn test_seen_tuples_stay_seen() {
        let mut table = NoveltyTable::new(3).unwrap();
        let state = [2, 0, 1];
        let mut previous = 1;
        for other in [[2, 1, 1], [0, 0, 0], [2, 0, 0], [1, 0, 1]] {
            table.evaluate(&other);
            // A fixed state only becomes less novel as more states are seen.
            let mut scratch = table.clone();
            let novelty = scratch.evaluate(&state);
            assert!(novelty >= previous);
            previous = novelty;
        }
        let before: Vec<usize> = (1..=3).map(|k| table.len(k)).collect();
        table.evaluate(&state);
        let after: Vec<usize> = (1..=3).map(|k| table.len(k)).collect();
        assert!(before.iter().zip(&after).all(|(b, a)| b <= a));
    }

    #[test]
    fn test_reset_and_bounds() {
        let mut table = NoveltyTable::new(2).unwrap();
        table.evaluate(&[0, 1]);
        table.reset();
        assert!(table.is_empty());
        assert_eq!(table.evaluate(&[0, 1]), 1);

        table.set_bound(1).unwrap();
        assert_eq!(table.evaluate(&[1, 1]), 1);
        assert_eq!(table.evaluate(&[0, 1]), 2);
        assert!(table.set_bound(3).is_err());
        assert!(NoveltyTable::new(0).is_err());
        assert!(NoveltyTable::new(MAX_NOVELTY_WIDTH + 1).is_err());
    }
}
