// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      0-based epoch number
//   - train_loss: mean cross-entropy over the epoch's steps
//   - train_acc:  accuracy on the epoch's last training batch
//   - test_acc:   accuracy on the full test set
//
// Why a fresh file per run?
//   Rows from an earlier run would otherwise mix with the new one,
//   and epoch numbers restart at 0 every run.
//
// How to read the metrics:
//   - train_loss should fall over the first epochs
//   - train_acc is one batch only, so it is noisy
//   - test_acc drives early stopping and checkpointing
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,train_acc,test_acc
//   0,0.693100,0.520000,0.510000
//   1,0.654300,0.600000,0.580000

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 0-based epoch number
    pub epoch:      usize,

    /// Mean cross-entropy over the epoch's optimizer steps
    pub train_loss: f64,

    /// Accuracy on the last training batch, range [0.0, 1.0]
    pub train_acc:  f64,

    /// Accuracy on the whole test set; 0.0 when the set is empty
    pub test_acc:   f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_acc: f64, test_acc: f64) -> Self {
        Self { epoch, train_loss, train_acc, test_acc }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// checkpoints/metrics.csv, header already written
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start a fresh CSV for this run, header included.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "epoch,train_loss,train_acc,test_acc")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.train_acc,
            m.test_acc,
        )?;

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_header() {
        let dir = std::env::temp_dir().join(format!("varlen-rnn-metrics-{}", std::process::id()));
        let logger = MetricsLogger::new(dir.display().to_string()).unwrap();
        logger.log(&EpochMetrics::new(0, 0.5, 0.75, 0.6)).unwrap();
        logger.log(&EpochMetrics::new(1, 0.25, 1.0, 0.7)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,train_acc,test_acc");
        assert_eq!(lines[1], "0,0.500000,0.750000,0.600000");
        assert_eq!(lines.len(), 3);

        // A new logger starts the file over
        let logger = MetricsLogger::new(dir.display().to_string()).unwrap();
        assert_eq!(fs::read_to_string(logger.csv_path()).unwrap().lines().count(), 1);
        let _ = fs::remove_dir_all(&dir);
    }
}
