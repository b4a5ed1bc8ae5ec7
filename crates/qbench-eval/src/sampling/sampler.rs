//! Per-partition index sampling

use crate::dataset::PartitionId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sha2::{Digest, Sha256};

/// Distinct indices into one partition, in iteration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleIndexSet(Vec<usize>);

impl SampleIndexSet {
    /// Every index in `[0, len)`
    pub fn full(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Number of indices
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no index was selected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices in iteration order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Consume into the underlying indices
    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

/// Chooses which items of a partition get asked.
///
/// With a seed, each partition draws from its own generator derived from the
/// seed and the partition identity, so the selection does not depend on the
/// order in which concurrent workers reach the sampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler {
    seed: Option<u64>,
}

impl Sampler {
    /// Create a sampler; `None` draws fresh randomness every time
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Seed in effect
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Sample `requested` distinct indices from a partition of `len` records.
    ///
    /// `None` or a request of at least `len` selects every index.
    pub fn sample(
        &self,
        partition: &PartitionId,
        len: usize,
        requested: Option<usize>,
    ) -> SampleIndexSet {
        match requested {
            Some(k) if k < len => {
                let mut rng = self.rng_for(partition);
                SampleIndexSet(rand::seq::index::sample(&mut rng, len, k).into_vec())
            }
            _ => SampleIndexSet::full(len),
        }
    }

    fn rng_for(&self, partition: &PartitionId) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(partition_seed(seed, partition)),
            None => StdRng::from_entropy(),
        }
    }
}

fn partition_seed(seed: u64, partition: &PartitionId) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(partition.dataset.as_bytes());
    hasher.update([0]);
    if let Some(subject) = &partition.subject {
        hasher.update(subject.as_bytes());
    }
    hasher.update([0]);
    hasher.update(partition.split.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn partition(subject: &str) -> PartitionId {
        PartitionId::new("Q", Some(subject), "train")
    }

    #[test]
    fn test_request_at_least_len_returns_everything() {
        let sampler = Sampler::new(None);
        for requested in [None, Some(10), Some(25)] {
            let set = sampler.sample(&partition("S1"), 10, requested);
            assert_eq!(set.into_vec(), (0..10).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_smaller_request_is_distinct_and_in_range() {
        let sampler = Sampler::new(None);
        for _ in 0..50 {
            let set = sampler.sample(&partition("S1"), 10, Some(3));
            assert_eq!(set.len(), 3);
            let unique: HashSet<usize> = set.iter().collect();
            assert_eq!(unique.len(), 3);
            assert!(set.iter().all(|i| i < 10));
        }
    }

    #[test]
    fn test_zero_request_and_empty_partition() {
        let sampler = Sampler::new(Some(1));
        assert!(sampler.sample(&partition("S1"), 10, Some(0)).is_empty());
        assert!(sampler.sample(&partition("S1"), 0, Some(3)).is_empty());
        assert!(sampler.sample(&partition("S1"), 0, None).is_empty());
    }

    #[test]
    fn test_seed_is_reproducible_per_partition() {
        let a = Sampler::new(Some(42));
        let b = Sampler::new(Some(42));
        assert_eq!(
            a.sample(&partition("S1"), 1000, Some(20)),
            b.sample(&partition("S1"), 1000, Some(20))
        );
        // Partitions draw independently of each other.
        assert_ne!(
            a.sample(&partition("S1"), 1000, Some(20)),
            a.sample(&partition("S2"), 1000, Some(20))
        );
    }
}
