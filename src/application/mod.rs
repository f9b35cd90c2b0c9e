// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no tensor code and no printing.
//
//   train_use_case   — clips → samples → adversarial training
//   summary_use_case — rebuild the networks and report shapes

// The training workflow
pub mod train_use_case;

// Architecture inspection
pub mod summary_use_case;
