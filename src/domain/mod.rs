// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing what the system works with:
// residue alphabets, labelled sequences, and the trait that
// any sequence source implements.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// Residue letter → token id mapping
pub mod alphabet;

// A single (possibly labelled) sequence record
pub mod sequence;

// Core abstractions that other layers implement
pub mod traits;
