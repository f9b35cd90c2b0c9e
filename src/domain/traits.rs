// ============================================================
// Layer 3 — Core Traits
// ============================================================

use anyhow::Result;
use crate::domain::frame::VideoClip;

// ─── ClipSource ───────────────────────────────────────────────────────────────
/// Any component that can provide high-resolution training clips.
///
/// Implementations:
///   - SyntheticClipSource → procedurally generated moving textures
pub trait ClipSource {
    /// Produce every clip this source has.
    fn load_all(&self) -> Result<Vec<VideoClip>>;
}
