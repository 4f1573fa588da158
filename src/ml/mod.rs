// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model and optimisation code lives here.
//
//   model.rs          — embedding → stacked RNN → length-masked
//                       final state → dense logits
//
//   early_stopping.rs — plateau policy on held-out accuracy
//
//   trainer.rs        — the epoch loop: random batches, Adam steps,
//                       train/test accuracy, checkpoint on
//                       improvement, early stop
//
//   inferencer.rs     — reloads the best checkpoint and classifies
//                       new sequences

/// Recurrent classifier architecture
pub mod model;

/// Plateau-based early stopping
pub mod early_stopping;

/// Training loop with evaluation and checkpointing
pub mod trainer;

/// Inference from a saved checkpoint
pub mod inferencer;
