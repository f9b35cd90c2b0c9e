// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From clip source to tensor batches:
//
//   SyntheticClipSource  → high-res VideoClips
//       │
//       ▼
//   ClipSample           → HR + box-downsampled LR, flattened
//       │
//       ▼
//   split_train_val      → seeded shuffle and split
//       │
//       ▼
//   ClipDataset          → Burn Dataset
//       │
//       ▼
//   ClipBatcher          → [N, T, C, H, W] tensors
//       │
//       ▼
//   DataLoader           → batches for the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Procedurally generated moving-texture clips
pub mod synthetic;

/// Implements Burn's Dataset trait for clip samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
