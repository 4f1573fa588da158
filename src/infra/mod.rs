// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by the training and predict
// workflows:
//
//   checkpoint.rs — best-model weights via Burn's CompactRecorder,
//                   plus the run configuration as JSON so
//                   `predict` can rebuild the same architecture
//
//   metrics.rs    — per-epoch loss and accuracy appended to a
//                   CSV file for plotting learning curves

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
