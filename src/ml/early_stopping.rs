// ============================================================
// Layer 5 — Early Stopping
// ============================================================
// Plateau detection on held-out accuracy.
//
//   - An epoch improves only if its accuracy is STRICTLY greater
//     than the best seen so far (the best starts at 0.0).
//   - Training stops once more than `patience` epochs have passed
//     since the last improvement.
//
// Epochs are 0-based and the last improvement starts at epoch 0,
// so a run that never improves stops at epoch `patience + 1`.
//
// Why strict improvement?
//   A tie does not move the checkpoint, so the saved weights always
//   come from the first epoch that reached the best accuracy.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// New best accuracy — worth reporting and checkpointing
    Improved,
    /// No gain yet, but still within patience
    Plateau,
    /// Patience exhausted — stop the run
    Stop,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience:         usize,
    best_accuracy:    f64,
    last_improvement: usize,
    improved_once:    bool,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_accuracy:    0.0,
            last_improvement: 0,
            improved_once:    false,
        }
    }

    /// Record the held-out accuracy of `epoch` and decide what to do next.
    pub fn observe(&mut self, epoch: usize, accuracy: f64) -> Verdict {
        if accuracy > self.best_accuracy {
            self.best_accuracy    = accuracy;
            self.last_improvement = epoch;
            self.improved_once    = true;
            return Verdict::Improved;
        }

        if epoch.saturating_sub(self.last_improvement) > self.patience {
            Verdict::Stop
        } else {
            Verdict::Plateau
        }
    }

    pub fn best_accuracy(&self) -> f64 {
        self.best_accuracy
    }

    /// Epoch of the best accuracy, `None` until something beat 0.0
    pub fn best_epoch(&self) -> Option<usize> {
        self.improved_once.then_some(self.last_improvement)
    }

    pub fn patience(&self) -> usize {
        self.patience
    }
}
