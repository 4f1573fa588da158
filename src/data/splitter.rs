// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles records and splits them into a training set (used to
// update weights) and a held-out test set (used for accuracy and
// early stopping).
//
// Why shuffle before splitting?
//   Input files are often grouped by class. Without a shuffle the
//   test set would hold only the last class in the file.
//
// Why take the RNG from the caller?
//   A fixed seed then reproduces the same split, and the same seed
//   also drives the batch sampler for a fully repeatable run.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.

use rand::{seq::SliceRandom, Rng};

/// Shuffle `samples` and split into (train, test).
///
/// The test part receives `round(len * test_fraction)` items.
pub fn split_train_test<T, R: Rng + ?Sized>(
    mut samples:   Vec<T>,
    test_fraction: f64,
    rng:           &mut R,
) -> (Vec<T>, Vec<T>) {
    samples.shuffle(rng);

    let total    = samples.len();
    let n_test   = ((total as f64) * test_fraction).round() as usize;
    let split_at = total - n_test.min(total);

    // split_off(n) removes elements [n..] and returns them
    let test = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} test ({}% / {}%)",
        samples.len(),
        test.len(),
        (samples.len() * 100) / total.max(1),
        (test.len()    * 100) / total.max(1),
    );

    (samples, test)
}
