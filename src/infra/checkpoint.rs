// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the best model using Burn's CompactRecorder.
//
// Only improvements are checkpointed, so the directory always
// holds the weights with the highest test accuracy so far:
//
//   checkpoints/
//     best_model.mpk.gz   ← weights of the best epoch
//     best_epoch.json     ← which epoch that was
//     train_config.json   ← run configuration (architecture included)
//     metrics.csv         ← written by MetricsLogger
//
// The config is required at load time: the model must be rebuilt
// with the exact same architecture before the weights fit into it.
//
// Why clear the old weights when a run starts?
//   train_config.json is rewritten at the start of every run, but
//   weights are only written on improvement. A run that never
//   improves would otherwise leave the new architecture paired with
//   the previous run's weights, and those cannot be loaded into it.
//
// Why two constructors?
//   `create` is for training and makes the directory. `open` is for
//   prediction and refuses a directory that isn't there, so a typo
//   in --checkpoint-dir fails instead of leaving an empty folder.

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::RnnClassifier;

const MODEL_FILE: &str  = "best_model";
const EPOCH_FILE: &str  = "best_epoch.json";
const CONFIG_FILE: &str = "train_config.json";

pub struct CheckpointManager {
    /// Directory holding every file listed above
    dir: PathBuf,
}

impl CheckpointManager {
    /// Checkpoint directory for a training run, created if missing.
    pub fn create(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Existing checkpoint directory of a previous run.
    pub fn open(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        if !dir.is_dir() {
            bail!(
                "Checkpoint directory '{}' does not exist. Run 'train' first.",
                dir.display()
            );
        }
        Ok(Self { dir })
    }

    /// Remove the best weights and their epoch pointer, if present.
    pub fn clear_best(&self) -> Result<()> {
        let model_path = self.dir.join(MODEL_FILE).with_extension("mpk.gz");
        for path in [model_path, self.dir.join(EPOCH_FILE)] {
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Cannot remove stale '{}'", path.display()))?;
                tracing::debug!("Removed stale '{}'", path.display());
            }
        }
        Ok(())
    }

    /// Overwrite the best checkpoint with `model`, trained up to `epoch`.
    pub fn save_model<B: Backend>(
        &self,
        model: &RnnClassifier<B>,
        epoch: usize,
    ) -> Result<()> {
        // Recorder appends the .mpk.gz extension itself
        let path = self.dir.join(MODEL_FILE);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let epoch_path = self.dir.join(EPOCH_FILE);
        fs::write(&epoch_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", epoch_path.display()))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the best weights into a freshly initialised `model`.
    pub fn load_model<B: Backend>(
        &self,
        model:  RnnClassifier<B>,
        device: &B::Device,
    ) -> Result<RnnClassifier<B>> {
        let epoch = self.best_epoch()?;
        let path  = self.dir.join(MODEL_FILE);

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'predict'.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    /// Epoch of the saved weights; an error if nothing was saved yet.
    pub fn best_epoch(&self) -> Result<usize> {
        let path = self.dir.join(EPOCH_FILE);

        let s = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot find '{}'. Have you run 'train' first \
                     (and did any epoch beat 0% test accuracy)?",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::ml::model::RnnType;

    type TestBackend = NdArray;

    fn scratch(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!("varlen-rnn-ckpt-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.display().to_string()
    }

    #[test]
    fn test_config_roundtrip() {
        let dir  = scratch("config");
        let ckpt = CheckpointManager::create(&dir).unwrap();
        let cfg  = TrainConfig { rnn_type: RnnType::BasicLstm, hidden_dim: 7, ..TrainConfig::default() };

        ckpt.save_config(&cfg).unwrap();
        let back = ckpt.load_config().unwrap();
        assert_eq!(back.rnn_type, RnnType::BasicLstm);
        assert_eq!(back.hidden_dim, 7);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_model_roundtrip_preserves_weights() {
        let dir    = scratch("model");
        let ckpt   = CheckpointManager::create(&dir).unwrap();
        let device = Default::default();
        let cfg    = TrainConfig { n_layers: 1, hidden_dim: 4, embed_dim: 3, ..TrainConfig::default() };

        let trained: RnnClassifier<TestBackend> = cfg.model_config().init(&device);
        ckpt.save_model(&trained, 4).unwrap();
        assert_eq!(ckpt.best_epoch().unwrap(), 4);

        let fresh: RnnClassifier<TestBackend> = cfg.model_config().init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        let tokens  = Tensor::<TestBackend, 2, Int>::from_ints([[1, 2, 3]], &device);
        let lengths = Tensor::<TestBackend, 1, Int>::from_ints([3], &device);
        let a: Vec<f32> = trained.forward(tokens.clone(), lengths.clone()).into_data().to_vec().unwrap();
        let b: Vec<f32> = loaded.forward(tokens, lengths).into_data().to_vec().unwrap();
        // CompactRecorder stores half precision, so only approximately equal
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-3, "{x} vs {y}");
        }
        let argmax = |v: &[f32]| v.iter().enumerate().max_by(|p, q| p.1.total_cmp(q.1)).map(|(i, _)| i);
        assert_eq!(argmax(&a), argmax(&b));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_clear_best_removes_weights_but_keeps_config() {
        let dir    = scratch("clear");
        let ckpt   = CheckpointManager::create(&dir).unwrap();
        let device = Default::default();
        let cfg    = TrainConfig { n_layers: 1, hidden_dim: 4, embed_dim: 3, ..TrainConfig::default() };

        ckpt.save_config(&cfg).unwrap();
        let model: RnnClassifier<TestBackend> = cfg.model_config().init(&device);
        ckpt.save_model(&model, 2).unwrap();
        assert!(PathBuf::from(&dir).join("best_model.mpk.gz").exists());

        ckpt.clear_best().unwrap();
        assert!(ckpt.best_epoch().is_err());
        assert!(!PathBuf::from(&dir).join("best_model.mpk.gz").exists());
        assert!(ckpt.load_config().is_ok());

        // Clearing an already empty directory is fine
        ckpt.clear_best().unwrap();
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_refuses_missing_directory() {
        let dir = scratch("absent");
        assert!(CheckpointManager::open(&dir).is_err());
        assert!(!PathBuf::from(&dir).exists());

        CheckpointManager::create(&dir).unwrap();
        assert!(CheckpointManager::open(&dir).is_ok());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir  = scratch("missing");
        let ckpt = CheckpointManager::create(&dir).unwrap();
        assert!(ckpt.best_epoch().is_err());
        assert!(ckpt.load_config().is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
