use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

use crate::types::Subset;

/// Disjoint train/val partition of image ids, in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSplit {
    pub train: Vec<String>,
    pub val: Vec<String>,
}

impl DatasetSplit {
    pub fn ids(&self, subset: Subset) -> &[String] {
        match subset {
            Subset::Train => &self.train,
            Subset::Val => &self.val,
        }
    }

    pub fn train_set(&self) -> HashSet<&str> {
        self.train.iter().map(String::as_str).collect()
    }

    pub fn val_set(&self) -> HashSet<&str> {
        self.val.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.val.is_empty()
    }
}

/// Shuffle `ids` with a generator seeded from `seed` and put the first
/// `floor(len * train_ratio)` of them into the training set.
///
/// The same ids, ratio and seed always give the same split.
pub fn split_ids(ids: &[String], train_ratio: f64, seed: u64) -> DatasetSplit {
    let mut shuffled = ids.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let train_ratio = train_ratio.clamp(0.0, 1.0);
    let train_size = (shuffled.len() as f64 * train_ratio).floor() as usize;
    let val = shuffled.split_off(train_size.min(shuffled.len()));

    DatasetSplit {
        train: shuffled,
        val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("image_{:03}", i)).collect()
    }

    #[test]
    fn test_split_is_deterministic() {
        let ids = ids(37);
        let first = split_ids(&ids, 0.8, 42);
        let second = split_ids(&ids, 0.8, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_is_a_partition() {
        let ids = ids(37);
        let split = split_ids(&ids, 0.8, 42);

        let train = split.train_set();
        let val = split.val_set();
        assert!(train.is_disjoint(&val));

        let union: HashSet<&str> = train.union(&val).copied().collect();
        let all: HashSet<&str> = ids.iter().map(String::as_str).collect();
        assert_eq!(union, all);
        assert_eq!(split.len(), ids.len());
    }

    #[test]
    fn test_split_ratio() {
        let split = split_ids(&ids(100), 0.8, 42);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.val.len(), 20);

        // floor, not round
        let split = split_ids(&ids(9), 0.8, 42);
        assert_eq!(split.train.len(), 7);
        assert_eq!(split.val.len(), 2);
    }

    #[test]
    fn test_split_edge_ratios() {
        let split = split_ids(&ids(10), 0.0, 1);
        assert!(split.train.is_empty());
        assert_eq!(split.val.len(), 10);

        let split = split_ids(&ids(10), 1.0, 1);
        assert_eq!(split.train.len(), 10);
        assert!(split.val.is_empty());

        assert!(split_ids(&[], 0.8, 42).is_empty());
    }

    #[test]
    fn test_different_seeds_shuffle_differently() {
        let ids = ids(50);
        assert_ne!(split_ids(&ids, 0.8, 1).train, split_ids(&ids, 0.8, 2).train);
    }
}
