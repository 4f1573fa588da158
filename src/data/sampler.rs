// ============================================================
// Layer 4 — Random Batch Sampler
// ============================================================
// Each training step draws a fresh batch of `batch_size` distinct
// samples uniformly at random. Draws are independent across steps,
// so within one epoch a sample may be seen several times or not at
// all. An epoch is `len / batch_size` such steps.
//
// Why not reuse Burn's DataLoader for training?
//   The DataLoader walks a shuffled permutation, one pass per epoch.
//   Training here draws each batch independently, and the last of
//   those batches is also what train accuracy is measured on.

use anyhow::{bail, Result};
use burn::data::dataset::Dataset;
use rand::{rngs::StdRng, seq::index, SeedableRng};

use crate::data::dataset::{SequenceDataset, SequenceSample};

pub struct BatchSampler {
    batch_size: usize,
    rng:        StdRng,
}

impl BatchSampler {
    /// Fails when the dataset cannot supply even one full batch.
    pub fn new(batch_size: usize, dataset_len: usize, seed: u64) -> Result<Self> {
        if batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        if batch_size > dataset_len {
            bail!(
                "batch size {} exceeds the {} available training sequences",
                batch_size,
                dataset_len
            );
        }
        Ok(Self { batch_size, rng: StdRng::seed_from_u64(seed) })
    }

    /// Number of optimizer steps that make up one epoch.
    pub fn batches_per_epoch(&self, dataset_len: usize) -> usize {
        dataset_len / self.batch_size
    }

    pub fn next_batch(&mut self, dataset: &SequenceDataset) -> Vec<SequenceSample> {
        index::sample(&mut self.rng, dataset.len(), self.batch_size)
            .into_iter()
            .filter_map(|i| dataset.get(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> SequenceDataset {
        SequenceDataset::new(
            (0..n)
                .map(|i| SequenceSample { token_ids: vec![1; i + 1], label: Some(i) })
                .collect(),
        )
    }

    #[test]
    fn test_batch_has_distinct_members() {
        let ds          = dataset(20);
        let mut sampler = BatchSampler::new(8, ds.len(), 3).unwrap();
        let batch       = sampler.next_batch(&ds);
        assert_eq!(batch.len(), 8);

        let mut labels: Vec<usize> = batch.iter().filter_map(|s| s.label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 8);
    }

    #[test]
    fn test_batches_per_epoch_uses_integer_division() {
        let sampler = BatchSampler::new(50, 120, 0).unwrap();
        assert_eq!(sampler.batches_per_epoch(120), 2);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let ds = dataset(30);
        let mut a = BatchSampler::new(5, ds.len(), 11).unwrap();
        let mut b = BatchSampler::new(5, ds.len(), 11).unwrap();
        assert_eq!(a.next_batch(&ds), b.next_batch(&ds));
    }

    #[test]
    fn test_rejects_oversized_batch() {
        assert!(BatchSampler::new(10, 9, 0).is_err());
        assert!(BatchSampler::new(0, 9, 0).is_err());
    }
}
