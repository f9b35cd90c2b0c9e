// ============================================================
// Layer 4 — Synthetic Clip Source
// ============================================================
// Produces video clips of smoothly moving sinusoidal textures:
//
//   p(c, y, x, t) = 0.5 + 0.25·sin(kx_c·(x − vx·t) + φx_c)
//                       + 0.25·cos(ky_c·(y − vy·t) + φy_c)
//
// Every clip has its own frequencies, phases and a constant
// velocity (vx, vy), so consecutive frames are related by a
// global translation, which is what FNet learns to recover.
// Values always stay in [0, 1].
//
// Generation is seeded, so the same config always yields the
// same clips.

use anyhow::{ensure, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::frame::{Frame, VideoClip};
use crate::domain::traits::ClipSource;

/// Largest per-frame displacement, in high-res pixels
const MAX_VELOCITY: f32 = 3.0;

#[derive(Debug, Clone)]
pub struct SyntheticClipSource {
    pub num_clips: usize,
    pub frames:    usize,
    pub channels:  usize,
    pub size:      usize,
    pub seed:      u64,
}

impl SyntheticClipSource {
    pub fn new(num_clips: usize, frames: usize, size: usize, seed: u64) -> Self {
        Self { num_clips, frames, channels: 3, size, seed }
    }

    fn clip(&self, rng: &mut StdRng) -> Result<VideoClip> {
        let vx = rng.gen_range(-MAX_VELOCITY..=MAX_VELOCITY);
        let vy = rng.gen_range(-MAX_VELOCITY..=MAX_VELOCITY);

        // (kx, ky, φx, φy) per channel
        let waves: Vec<[f32; 4]> = (0..self.channels)
            .map(|_| [
                rng.gen_range(0.05..0.4),
                rng.gen_range(0.05..0.4),
                rng.gen_range(0.0..std::f32::consts::TAU),
                rng.gen_range(0.0..std::f32::consts::TAU),
            ])
            .collect();

        let frames = (0..self.frames)
            .map(|t| {
                let shift_x = vx * t as f32;
                let shift_y = vy * t as f32;
                let mut pixels = Vec::with_capacity(self.channels * self.size * self.size);
                for [kx, ky, px, py] in &waves {
                    for y in 0..self.size {
                        for x in 0..self.size {
                            let u = kx * (x as f32 - shift_x) + px;
                            let v = ky * (y as f32 - shift_y) + py;
                            pixels.push(0.5 + 0.25 * u.sin() + 0.25 * v.cos());
                        }
                    }
                }
                Frame::new(self.channels, self.size, self.size, pixels)
            })
            .collect::<Result<Vec<_>>>()?;

        VideoClip::new(frames)
    }
}

impl ClipSource for SyntheticClipSource {
    fn load_all(&self) -> Result<Vec<VideoClip>> {
        ensure!(self.frames > 0, "clips need at least one frame");
        ensure!(self.size > 0, "frame size must be positive");

        let mut rng = StdRng::seed_from_u64(self.seed);
        let clips = (0..self.num_clips)
            .map(|_| self.clip(&mut rng))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Generated {} synthetic clips ({} frames of {}x{})",
            clips.len(), self.frames, self.size, self.size
        );
        Ok(clips)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_count_and_shape() {
        let clips = SyntheticClipSource::new(4, 3, 16, 7).load_all().unwrap();
        assert_eq!(clips.len(), 4);
        assert!(clips.iter().all(|c| c.len() == 3 && c.frame_shape() == [3, 16, 16]));
    }

    #[test]
    fn test_values_in_unit_range() {
        let clips = SyntheticClipSource::new(2, 3, 8, 1).load_all().unwrap();
        assert!(clips
            .iter()
            .flat_map(|c| c.to_flat())
            .all(|v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_same_seed_same_clips() {
        let a = SyntheticClipSource::new(2, 2, 8, 42).load_all().unwrap();
        let b = SyntheticClipSource::new(2, 2, 8, 42).load_all().unwrap();
        let c = SyntheticClipSource::new(2, 2, 8, 43).load_all().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_frames_move() {
        let clips = SyntheticClipSource::new(1, 2, 16, 3).load_all().unwrap();
        let f     = clips[0].frames();
        assert_ne!(f[0].pixels(), f[1].pixels());
    }

    #[test]
    fn test_zero_frames_is_an_error() {
        assert!(SyntheticClipSource::new(1, 0, 8, 0).load_all().is_err());
    }
}
