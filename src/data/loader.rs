// ============================================================
// Layer 4 — Sequence Loader
// ============================================================
// Reads a delimited text file with one record per line:
//
//   sequence,label
//   MKVLAAGIVGLLLA,0
//   MSTNPKPQRKTKRNTNRRPQDVKFPGG,1
//
// The first field is the residue string and the last field is the
// integer class label. A line with a single field is unlabeled
// (used by `predict`). Blank lines and `#` comments are skipped.
// A first line whose label is not an integer is a header.

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::sequence::LabeledSequence;
use crate::domain::traits::SequenceSource;

pub struct CsvSequenceLoader {
    path:      PathBuf,
    /// Single-character field separator, `,` by default
    delimiter: char,
}

impl CsvSequenceLoader {
    pub fn new(path: impl Into<PathBuf>, delimiter: char) -> Self {
        Self { path: path.into(), delimiter }
    }

    /// Parse file contents that were already read into memory.
    pub fn parse(&self, contents: &str) -> Result<Vec<LabeledSequence>> {
        let mut records   = Vec::new();
        let mut seen_data = false;

        for (idx, raw_line) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let line    = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(self.delimiter).map(str::trim).collect();
            let residues: String = fields[0].chars().filter(|c| !c.is_whitespace()).collect();

            let label = if fields.len() >= 2 {
                let raw = fields[fields.len() - 1];
                match raw.parse::<usize>() {
                    Ok(label) => Some(label),
                    Err(_) if !seen_data => {
                        tracing::debug!("Treating line {} as a header: '{}'", line_no, line);
                        seen_data = true;
                        continue;
                    }
                    Err(e) => bail!(
                        "{}:{}: label '{}' is not a non-negative integer ({e})",
                        self.path.display(),
                        line_no,
                        raw
                    ),
                }
            } else {
                None
            };
            seen_data = true;

            if residues.is_empty() {
                tracing::warn!(
                    "Skipping {}:{}: empty sequence",
                    self.path.display(),
                    line_no
                );
                continue;
            }

            records.push(LabeledSequence::new(residues, label));
        }

        Ok(records)
    }
}

impl SequenceSource for CsvSequenceLoader {
    fn load_all(&self) -> Result<Vec<LabeledSequence>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read input file '{}'", self.path.display()))?;

        let records = self.parse(&contents)?;
        tracing::info!(
            "Loaded {} sequences from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
