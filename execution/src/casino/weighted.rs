//! Weighted categorical sampling.
//!
//! Weights are stored as a cumulative table and a draw `r` in `[0, total)` is mapped to the first
//! entry whose cumulative weight exceeds it (binary search). This is equivalent to expanding each
//! entry `weight` times into a pool and picking uniformly, without building the pool.

use super::GameRng;

#[derive(Clone, Debug)]
pub struct WeightedTable<T> {
    items: Vec<T>,
    cumulative: Vec<u32>,
}

impl<T: Copy> WeightedTable<T> {
    /// Build a table from `(item, weight)` pairs. Zero-weight entries can never be drawn.
    ///
    /// Returns `None` when the total weight is zero.
    pub fn new(entries: &[(T, u32)]) -> Option<Self> {
        let mut items = Vec::with_capacity(entries.len());
        let mut cumulative = Vec::with_capacity(entries.len());
        let mut total = 0u32;
        for &(item, weight) in entries {
            total = total.checked_add(weight)?;
            items.push(item);
            cumulative.push(total);
        }
        if total == 0 {
            return None;
        }
        Some(Self { items, cumulative })
    }

    pub fn total_weight(&self) -> u32 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Map a draw in `[0, total_weight)` to its item.
    pub fn pick(&self, draw: u32) -> T {
        let idx = self.cumulative.partition_point(|&c| c <= draw);
        self.items[idx.min(self.items.len() - 1)]
    }

    pub fn sample(&self, rng: &mut GameRng) -> T {
        let draw = rng.next_bounded_u32(self.total_weight());
        self.pick(draw)
    }

    /// Probability of drawing `item`, as `(weight, total)`.
    pub fn odds(&self, item: T) -> (u32, u32)
    where
        T: PartialEq,
    {
        let mut prev = 0;
        let mut weight = 0;
        for (i, &c) in self.cumulative.iter().enumerate() {
            if self.items[i] == item {
                weight += c - prev;
            }
            prev = c;
        }
        (weight, self.total_weight())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_matches_pool_expansion() {
        let table = WeightedTable::new(&[('a', 3), ('b', 0), ('c', 1), ('d', 2)]).unwrap();
        assert_eq!(table.total_weight(), 6);
        let pool = ['a', 'a', 'a', 'c', 'd', 'd'];
        for (draw, expected) in pool.iter().enumerate() {
            assert_eq!(table.pick(draw as u32), *expected);
        }
        assert_eq!(table.odds('a'), (3, 6));
        assert_eq!(table.odds('b'), (0, 6));
    }

    #[test]
    fn test_zero_total_rejected() {
        assert!(WeightedTable::new(&[(1u8, 0), (2u8, 0)]).is_none());
        assert!(WeightedTable::<u8>::new(&[]).is_none());
    }

    #[test]
    fn test_sample_frequencies() {
        let table = WeightedTable::new(&[(0usize, 15), (1usize, 1)]).unwrap();
        let mut rng = GameRng::new(&[9u8; 32], 1, 0);
        let mut counts = [0u32; 2];
        for _ in 0..16_000 {
            counts[table.sample(&mut rng)] += 1;
        }
        // Expect ~1000 rare draws.
        assert!(counts[1] > 700 && counts[1] < 1300, "rare count {}", counts[1]);
    }
}
