// ============================================================
// Layer 3 — Residue Alphabet
// ============================================================
// Maps protein residue letters to integer token ids.
//
//   0        → padding (never produced by `encode`)
//   1..=20   → the 20 standard amino acids, in alphabetical
//              one-letter order: A C D E F G H I K L M N P Q R S T V W Y
//   21       → anything else (X, B, Z, U, O, stray symbols)
//
// Because padding is always 0, the length of an encoded sequence
// equals the number of non-zero entries in its padded row.

/// Token id reserved for right-padding.
pub const PAD_ID: u32 = 0;

/// Token id for residues outside the standard twenty.
pub const UNKNOWN_ID: u32 = 21;

/// Number of distinct token ids (padding + 20 residues + unknown).
pub const VOCAB_SIZE: usize = 22;

const STANDARD_RESIDUES: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

/// Token id for a single residue character (case-insensitive).
pub fn residue_id(c: char) -> u32 {
    let upper = c.to_ascii_uppercase();
    if !upper.is_ascii() {
        return UNKNOWN_ID;
    }
    STANDARD_RESIDUES
        .iter()
        .position(|&r| r == upper as u8)
        .map(|i| i as u32 + 1)
        .unwrap_or(UNKNOWN_ID)
}

/// Encode a residue string into token ids, ignoring whitespace.
pub fn encode(residues: &str) -> Vec<u32> {
    residues
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(residue_id)
        .collect()
}
