// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<SequenceSample>
// of ragged sequences into rectangular tensors.
//
// Padding:
//   Every row is right-padded with PAD_ID (0) up to the batch
//   width. The true lengths travel alongside the tokens so the
//   model can read each sequence's state at step `length - 1`.
//
//   Width::Fixed(w)  every batch is [N, w]; used for training and
//                    evaluation so the tensor shape never changes
//   Width::Longest   width is the longest sequence in this batch;
//                    used for prediction on unseen files
//
// Sequences longer than a fixed width are truncated and their
// length clamped to the width.
//
// Why a fixed width during training?
//   Every training batch then has the same [N, w] shape, matching
//   the fixed-shape input the network was designed around. Extra
//   padding is harmless because the state is read at `length - 1`.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SequenceSample;
use crate::domain::alphabet::PAD_ID;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Fixed(usize),
    Longest,
}

/// A batch ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Padded token ids — shape: [batch_size, width]
    pub tokens: Tensor<B, 2, Int>,

    /// Non-padding lengths — shape: [batch_size], every entry ≥ 1
    pub lengths: Tensor<B, 1, Int>,

    /// Class labels — shape: [batch_size]; 0 for unlabeled samples
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device: B::Device,
    pub width:  Width,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn fixed(device: B::Device, width: usize) -> Self {
        Self { device, width: Width::Fixed(width) }
    }

    pub fn longest(device: B::Device) -> Self {
        Self { device, width: Width::Longest }
    }
}

/// Right-pad (or truncate) one row to `width`, returning the row and
/// its effective length.
pub fn pad_row(token_ids: &[u32], width: usize) -> (Vec<i32>, usize) {
    let length  = token_ids.len().min(width);
    let mut row = Vec::with_capacity(width);
    row.extend(token_ids[..length].iter().map(|&t| t as i32));
    row.resize(width, PAD_ID as i32);
    (row, length)
}

impl<B: Backend> Batcher<SequenceSample, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<SequenceSample>) -> SequenceBatch<B> {
        let batch_size = items.len();
        let width = match self.width {
            Width::Fixed(w) => w,
            Width::Longest  => items.iter().map(SequenceSample::length).max().unwrap_or(0),
        };

        let mut tokens_flat = Vec::with_capacity(batch_size * width);
        let mut lengths     = Vec::with_capacity(batch_size);
        for item in &items {
            let (row, length) = pad_row(&item.token_ids, width);
            tokens_flat.extend(row);
            lengths.push(length.max(1) as i32);
        }

        let targets: Vec<i32> = items
            .iter()
            .map(|s| s.label.unwrap_or(0) as i32)
            .collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(
            tokens_flat.as_slice(), &self.device
        ).reshape([batch_size, width]);

        let lengths = Tensor::<B, 1, Int>::from_ints(lengths.as_slice(), &self.device);
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        SequenceBatch { tokens, lengths, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn sample(ids: &[u32], label: usize) -> SequenceSample {
        SequenceSample { token_ids: ids.to_vec(), label: Some(label) }
    }

    #[test]
    fn test_pad_row_right_pads_with_zero() {
        let (row, len) = pad_row(&[3, 4], 5);
        assert_eq!(row, vec![3, 4, 0, 0, 0]);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_pad_row_truncates_long_rows() {
        let (row, len) = pad_row(&[1, 2, 3, 4], 2);
        assert_eq!(row, vec![1, 2]);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_fixed_width_batch_shapes() {
        let batcher = SequenceBatcher::<TestBackend>::fixed(Default::default(), 6);
        let batch   = batcher.batch(vec![sample(&[1, 2, 3], 0), sample(&[5], 1)]);

        assert_eq!(batch.tokens.dims(), [2, 6]);
        let lengths: Vec<i64> = batch.lengths.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(lengths, vec![3, 1]);
        let targets: Vec<i64> = batch.targets.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(targets, vec![0, 1]);
    }

    #[test]
    fn test_padding_count_matches_lengths() {
        let batcher = SequenceBatcher::<TestBackend>::fixed(Default::default(), 4);
        let batch   = batcher.batch(vec![sample(&[7, 8], 0)]);
        let tokens: Vec<i64> = batch.tokens.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(tokens.iter().filter(|&&t| t != 0).count(), 2);
    }

    #[test]
    fn test_longest_width_follows_batch() {
        let batcher = SequenceBatcher::<TestBackend>::longest(Default::default());
        let batch   = batcher.batch(vec![sample(&[1, 2, 3, 4, 5], 0), sample(&[5], 1)]);
        assert_eq!(batch.tokens.dims(), [2, 5]);
    }
}
