// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal
// (training, or predicting with a trained model).
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No argument parsing (that's Layer 1)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// The classification workflow over a trained checkpoint
pub mod predict_use_case;
