// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing video data, independent of Burn:
//
//   frame.rs  — Frame (CHW pixels) and VideoClip (ordered frames)
//   traits.rs — ClipSource, anything that can produce clips
//
// No tensors and no file I/O in this layer, so everything here
// is testable without a backend.

// A single image and an ordered sequence of them
pub mod frame;

// Core abstractions other layers implement
pub mod traits;
