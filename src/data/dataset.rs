// ============================================================
// Layer 4 — Sequence Dataset
// ============================================================
// Encoded sequences held in memory behind Burn's Dataset trait,
// so the DataLoader used for evaluation can iterate them.
//
// Why keep samples unpadded here?
//   The padding width depends on the caller: training pads to the
//   longest sequence of the whole run, prediction only to the
//   longest of each batch. The batcher decides, not the dataset.
//
// Why does a dataset know its max length and classes?
//   The trainer needs the global max length to fix the tensor
//   width, and the data summary prints the distinct classes.

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::sequence::LabeledSequence;

/// One encoded, still unpadded sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSample {
    /// Residue ids, 1..=21; never contains PAD_ID
    pub token_ids: Vec<u32>,
    /// Class index, None for records read without a label
    pub label:     Option<usize>,
}

impl SequenceSample {
    /// Number of non-padding time steps
    pub fn length(&self) -> usize {
        self.token_ids.len()
    }
}

impl From<&LabeledSequence> for SequenceSample {
    fn from(seq: &LabeledSequence) -> Self {
        Self { token_ids: seq.token_ids(), label: seq.label }
    }
}

pub struct SequenceDataset {
    samples: Vec<SequenceSample>,
}

impl SequenceDataset {
    pub fn new(samples: Vec<SequenceSample>) -> Self { Self { samples } }

    pub fn from_sequences(sequences: &[LabeledSequence]) -> Self {
        Self::new(sequences.iter().map(SequenceSample::from).collect())
    }

    pub fn samples(&self) -> &[SequenceSample] { &self.samples }

    /// Longest sequence in the dataset, 0 when empty
    pub fn max_length(&self) -> usize {
        self.samples.iter().map(SequenceSample::length).max().unwrap_or(0)
    }

    /// Sorted distinct labels
    pub fn classes(&self) -> Vec<usize> {
        let mut classes: Vec<usize> = self.samples.iter().filter_map(|s| s.label).collect();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    pub fn is_fully_labeled(&self) -> bool {
        self.samples.iter().all(|s| s.label.is_some())
    }
}

impl Dataset<SequenceSample> for SequenceDataset {
    fn get(&self, index: usize) -> Option<SequenceSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> SequenceDataset {
        SequenceDataset::from_sequences(&[
            LabeledSequence::new("MKV", Some(2)),
            LabeledSequence::new("AAWWYY", Some(0)),
            LabeledSequence::new("C", Some(2)),
        ])
    }

    #[test]
    fn test_max_length() {
        assert_eq!(dataset().max_length(), 6);
        assert_eq!(SequenceDataset::new(Vec::new()).max_length(), 0);
    }

    #[test]
    fn test_classes_sorted_and_unique() {
        assert_eq!(dataset().classes(), vec![0, 2]);
    }

    #[test]
    fn test_dataset_trait_access() {
        let ds = dataset();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.get(2).map(|s| s.length()), Some(1));
        assert!(ds.get(3).is_none());
    }
}
