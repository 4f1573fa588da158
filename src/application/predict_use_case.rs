// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Classifies every record of a sequence file with the best
// checkpoint from a previous `train` run. When the file carries
// labels for every record, the overall accuracy is reported too.
//
// Prediction never writes to the checkpoint directory. A missing
// directory, config or weights file is reported as an error that
// tells the user to run `train` first.

use anyhow::Result;
use burn::prelude::Backend;

use crate::data::dataset::SequenceSample;
use crate::data::loader::CsvSequenceLoader;
use crate::domain::traits::SequenceSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{Inferencer, Prediction};

type InferBackend = burn::backend::Wgpu;

/// Result of classifying one input file.
#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub predictions: Vec<(String, Prediction)>,
    /// Present only when every record had a label
    pub accuracy:    Option<f64>,
}

pub struct PredictUseCase<B: Backend = InferBackend> {
    inferencer: Inferencer<B>,
    /// Field separator of the files passed to `execute`
    delimiter:  char,
}

impl PredictUseCase<InferBackend> {
    pub fn new(checkpoint_dir: &str, delimiter: char) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        Self::with_device(checkpoint_dir, delimiter, device)
    }
}

impl<B: Backend> PredictUseCase<B> {
    pub fn with_device(checkpoint_dir: &str, delimiter: char, device: B::Device) -> Result<Self> {
        let ckpt       = CheckpointManager::open(checkpoint_dir)?;
        let inferencer = Inferencer::from_checkpoint(&ckpt, device)?;
        Ok(Self { inferencer, delimiter })
    }

    pub fn execute(&self, input_file: &str) -> Result<PredictionReport> {
        let sequences = CsvSequenceLoader::new(input_file, self.delimiter).load_all()?;
        let samples: Vec<SequenceSample> = sequences.iter().map(SequenceSample::from).collect();
        let predictions = self.inferencer.predict(&samples)?;

        let accuracy = if !sequences.is_empty() && sequences.iter().all(|s| s.label.is_some()) {
            let correct = sequences
                .iter()
                .zip(&predictions)
                .filter(|(s, p)| s.label == Some(p.label))
                .count();
            Some(correct as f64 / sequences.len() as f64)
        } else {
            None
        };

        Ok(PredictionReport {
            predictions: sequences.into_iter().map(|s| s.residues).zip(predictions).collect(),
            accuracy,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::application::train_use_case::TrainConfig;
    use crate::ml::model::RnnClassifier;

    #[test]
    fn test_predicts_from_saved_checkpoint() {
        let dir = std::env::temp_dir().join(format!("varlen-rnn-predict-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let dir_str = dir.display().to_string();

        let cfg = TrainConfig {
            checkpoint_dir: dir_str.clone(),
            n_layers: 1, hidden_dim: 4, embed_dim: 3,
            ..TrainConfig::default()
        };
        let ckpt = CheckpointManager::create(&dir_str).unwrap();
        ckpt.save_config(&cfg).unwrap();
        let model: RnnClassifier<NdArray> = cfg.model_config().init(&Default::default());
        ckpt.save_model(&model, 0).unwrap();

        let labelled = dir.join("labelled.csv");
        std::fs::write(&labelled, "sequence,label\nMKV,0\nWWWY,1\n").unwrap();
        let unlabelled = dir.join("unlabelled.csv");
        std::fs::write(&unlabelled, "MKV\nWWWY\n").unwrap();

        let use_case = PredictUseCase::<NdArray>::with_device(&dir_str, ',', Default::default()).unwrap();

        let report = use_case.execute(&labelled.display().to_string()).unwrap();
        assert_eq!(report.predictions.len(), 2);
        assert_eq!(report.predictions[0].0, "MKV");
        let acc = report.accuracy.unwrap();
        assert!((0.0..=1.0).contains(&acc));

        let report = use_case.execute(&unlabelled.display().to_string()).unwrap();
        assert!(report.accuracy.is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_checkpoint_dir_fails() {
        let dir = std::env::temp_dir().join(format!("varlen-rnn-nockpt-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let res = PredictUseCase::<NdArray>::with_device(&dir.display().to_string(), ',', Default::default());
        assert!(res.is_err());
        assert!(!dir.exists(), "predict must not create the checkpoint directory");
    }
}
