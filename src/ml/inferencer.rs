// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the trained architecture from the saved config, loads
// the best weights, and classifies sequences. Batches are padded
// only to their own longest member; the final state is read at
// each sequence's own length, so the width doesn't matter.

use anyhow::{anyhow, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::activation,
};

use crate::data::{batcher::SequenceBatcher, dataset::SequenceSample};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::RnnClassifier;

const PREDICT_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label:      usize,
    /// Softmax probability of `label`
    pub confidence: f32,
}

pub struct Inferencer<B: Backend> {
    model:   RnnClassifier<B>,
    batcher: SequenceBatcher<B>,
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        // Dropout only matters while training
        let model = cfg.model_config().with_dropout(0.0).init::<B>(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint ({} × {} layers)", cfg.rnn_type, cfg.n_layers);
        Ok(Self::new(model, device))
    }

    pub fn new(model: RnnClassifier<B>, device: B::Device) -> Self {
        Self { model, batcher: SequenceBatcher::longest(device) }
    }

    pub fn predict(&self, samples: &[SequenceSample]) -> Result<Vec<Prediction>> {
        let mut predictions = Vec::with_capacity(samples.len());

        for chunk in samples.chunks(PREDICT_BATCH_SIZE) {
            let batch  = self.batcher.batch(chunk.to_vec());
            let logits = self.model.forward(batch.tokens, batch.lengths);
            let [rows, n_classes] = logits.dims();

            let probs: Vec<f32> = activation::softmax(logits, 1)
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read class probabilities: {e:?}"))?;

            for row in probs.chunks(n_classes).take(rows) {
                let (label, &confidence) = row
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .ok_or_else(|| anyhow!("model produced no class scores"))?;
                predictions.push(Prediction { label, confidence });
            }
        }

        Ok(predictions)
    }
}
