// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration
//   Step 2: Load sequences              (Layer 4 - data)
//   Step 3: Seeded train/test split     (Layer 4 - data)
//   Step 4: Report data details
//   Step 5: Build datasets              (Layer 4 - data)
//   Step 6: Save config, open metrics   (Layer 6 - infra)
//   Step 7: Run training loop           (Layer 5 - ml)
//
// Why check labels and batch size here and not in the loop?
//   Step 6 rewrites train_config.json and drops the old weights.
//   A run that is going to fail must do so before that, so the
//   previous checkpoint stays usable by `predict`.

use anyhow::{bail, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::SequenceDataset,
    loader::CsvSequenceLoader,
    splitter::split_train_test,
};
use crate::domain::{alphabet::VOCAB_SIZE, sequence::LabeledSequence, traits::SequenceSource};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::model::{RnnClassifierConfig, RnnType};
use crate::ml::trainer::{run_training, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for a training run. Serialisable so `predict` can
// rebuild the exact architecture from train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub input_file:     String,
    pub delimiter:      char,
    pub checkpoint_dir: String,
    pub rnn_type:       RnnType,
    pub batch_size:     usize,
    pub n_layers:       usize,
    pub hidden_dim:     usize,
    pub embed_dim:      usize,
    pub n_classes:      usize,
    pub in_keep_prob:   f64,
    pub learning_rate:  f64,
    pub n_epochs:       usize,
    pub patience:       usize,
    pub test_fraction:  f64,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            input_file:     "data/proteins_varlen.csv".to_string(),
            delimiter:      ',',
            checkpoint_dir: "checkpoints".to_string(),
            rnn_type:       RnnType::Gru,
            batch_size:     50,
            n_layers:       10,
            hidden_dim:     50,
            embed_dim:      16,
            n_classes:      2,
            in_keep_prob:   1.0,
            learning_rate:  0.001,
            n_epochs:       100,
            patience:       10,
            test_fraction:  0.2,
            seed:           42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.n_layers == 0 || self.hidden_dim == 0 || self.embed_dim == 0 {
            bail!("n_layers, hidden_dim and embed_dim must all be at least 1");
        }
        if self.n_classes < 2 {
            bail!("n_classes must be at least 2, got {}", self.n_classes);
        }
        if !(self.in_keep_prob > 0.0 && self.in_keep_prob <= 1.0) {
            bail!("in_keep_prob must be in (0, 1], got {}", self.in_keep_prob);
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            bail!("learning_rate must be positive, got {}", self.learning_rate);
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            bail!("test_fraction must be in [0, 1), got {}", self.test_fraction);
        }
        Ok(())
    }

    pub fn model_config(&self) -> RnnClassifierConfig {
        RnnClassifierConfig::new(
            VOCAB_SIZE,
            self.embed_dim,
            self.hidden_dim,
            self.n_layers,
            self.n_classes,
            self.rnn_type,
        )
        .with_dropout(1.0 - self.in_keep_prob)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

/// Everything the training loop needs, built once every check passed.
struct PreparedRun {
    train_dataset: SequenceDataset,
    test_dataset:  SequenceDataset,
    ckpt_manager:  CheckpointManager,
    metrics:       MetricsLogger,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingReport> {
        let run = self.prepare()?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        run_training(&self.config, run.train_dataset, run.test_dataset, &run.ckpt_manager, &run.metrics)
    }

    /// Steps 1-6. Nothing in the checkpoint directory is touched until
    /// the config and the data have passed every check.
    fn prepare(&self) -> Result<PreparedRun> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load sequences ────────────────────────────────────────────
        let loader    = CsvSequenceLoader::new(&cfg.input_file, cfg.delimiter);
        let sequences = loader.load_all()?;
        if sequences.is_empty() {
            bail!("no sequences found in '{}'", cfg.input_file);
        }
        check_labels(&sequences, cfg)?;

        // ── Step 3: Train / test split ────────────────────────────────────────
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let (train_seqs, test_seqs) = split_train_test(sequences, cfg.test_fraction, &mut rng);
        if cfg.batch_size > train_seqs.len() {
            bail!(
                "batch_size {} is larger than the training set ({} sequences); \
                 an epoch would contain no steps",
                cfg.batch_size,
                train_seqs.len()
            );
        }

        // ── Step 4 + 5: Datasets and data details ─────────────────────────────
        let train_dataset = SequenceDataset::from_sequences(&train_seqs);
        let test_dataset  = SequenceDataset::from_sequences(&test_seqs);

        println!("\n=================================\nData details:");
        println!("- Training-set:\t\t{}", train_dataset.samples().len());
        println!("- Test-set:\t\t{}", test_dataset.samples().len());
        println!("- Classes:\t\t{:?}", train_dataset.classes());
        println!("=================================\n");

        // ── Step 6: Fresh checkpoint dir, persist config, open metrics log ────
        let ckpt_manager = CheckpointManager::create(&cfg.checkpoint_dir)?;
        ckpt_manager.clear_best()?;
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        Ok(PreparedRun { train_dataset, test_dataset, ckpt_manager, metrics })
    }
}

/// Every record needs a label, and every label must fit the output layer.
fn check_labels(sequences: &[LabeledSequence], cfg: &TrainConfig) -> Result<()> {
    for (pos, seq) in sequences.iter().enumerate() {
        match seq.label {
            None => bail!(
                "sequence #{} in '{}' has no label; training needs `sequence{}label` records",
                pos + 1,
                cfg.input_file,
                cfg.delimiter
            ),
            Some(label) if label >= cfg.n_classes => bail!(
                "sequence #{} in '{}': label {} is out of range for n_classes = {}",
                pos + 1,
                cfg.input_file,
                label,
                cfg.n_classes
            ),
            Some(_) => {}
        }
    }
    Ok(())
}
