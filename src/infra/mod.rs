// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the use cases and the trainer:
//
//   checkpoint.rs — network weights (CompactRecorder) and the
//                   training config (JSON), so a run's networks
//                   can be rebuilt exactly
//
//   metrics.rs    — per-epoch losses and validation PSNR,
//                   appended to a CSV file

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
