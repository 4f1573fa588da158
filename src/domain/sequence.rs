// ============================================================
// Layer 3 — LabeledSequence Domain Type
// ============================================================
// One record from the input file: a residue string and,
// when the file provides one, its integer class label.

use serde::{Deserialize, Serialize};

use crate::domain::alphabet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSequence {
    /// Residue letters exactly as read (whitespace already removed)
    pub residues: String,

    /// Class label, absent for prediction-only inputs
    pub label: Option<usize>,
}

impl LabeledSequence {
    pub fn new(residues: impl Into<String>, label: Option<usize>) -> Self {
        Self {
            residues: residues.into(),
            label,
        }
    }

    pub fn token_ids(&self) -> Vec<u32> {
        alphabet::encode(&self.residues)
    }
}
