// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the delimited input file and the
// fixed-shape tensor batches the model consumes.
//
//   proteins.csv
//       │
//       ▼
//   CsvSequenceLoader → parses records (residues + label)
//       │
//       ▼
//   split_train_test  → seeded shuffle, train / test partition
//       │
//       ▼
//   SequenceDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   BatchSampler      → random fixed-size training batches
//       │
//       ▼
//   SequenceBatcher   → right-pads to a fixed width, builds tensors

/// Reads delimited sequence files
pub mod loader;

/// Implements Burn's Dataset trait for encoded sequences
pub mod dataset;

/// Seeded shuffle and train/test split
pub mod splitter;

/// Draws random training batches without replacement
pub mod sampler;

/// Implements Burn's Batcher trait with length-preserving padding
pub mod batcher;
