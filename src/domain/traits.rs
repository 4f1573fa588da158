// ============================================================
// Layer 3 — Core Traits
// ============================================================

use anyhow::Result;
use crate::domain::sequence::LabeledSequence;

// ─── SequenceSource ───────────────────────────────────────────────────────────
/// Anything that can produce the full list of sequence records.
///
/// Implementations:
///   - CsvSequenceLoader → delimited text file, one record per line
pub trait SequenceSource {
    fn load_all(&self) -> Result<Vec<LabeledSequence>>;
}
