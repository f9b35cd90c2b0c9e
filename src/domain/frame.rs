// ============================================================
// Layer 3 — Frame and VideoClip
// ============================================================
// A Frame stores pixels channel-major (CHW), the same order the
// networks consume, so flattening a clip is a plain concat.
//
// Example:
//   let hr = Frame::new(3, 128, 128, pixels)?;
//   let lr = hr.box_downsample(4)?;   // 3 × 32 × 32

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

/// One image, pixels in CHW order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub channels: usize,
    pub height:   usize,
    pub width:    usize,
    pixels:       Vec<f32>,
}

impl Frame {
    pub fn new(channels: usize, height: usize, width: usize, pixels: Vec<f32>) -> Result<Self> {
        ensure!(
            pixels.len() == channels * height * width,
            "frame {}x{}x{} needs {} pixels, got {}",
            channels, height, width,
            channels * height * width,
            pixels.len(),
        );
        Ok(Self { channels, height, width, pixels })
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn get(&self, c: usize, y: usize, x: usize) -> f32 {
        self.pixels[(c * self.height + y) * self.width + x]
    }

    /// Average every factor×factor block into one pixel.
    pub fn box_downsample(&self, factor: usize) -> Result<Frame> {
        if factor == 0 || self.height % factor != 0 || self.width % factor != 0 {
            bail!(
                "cannot downsample {}x{} by {}",
                self.height, self.width, factor
            );
        }

        let (h, w) = (self.height / factor, self.width / factor);
        let norm   = (factor * factor) as f32;
        let mut out = Vec::with_capacity(self.channels * h * w);

        for c in 0..self.channels {
            for y in 0..h {
                for x in 0..w {
                    let mut sum = 0.0f32;
                    for dy in 0..factor {
                        for dx in 0..factor {
                            sum += self.get(c, y * factor + dy, x * factor + dx);
                        }
                    }
                    out.push(sum / norm);
                }
            }
        }

        Frame::new(self.channels, h, w, out)
    }
}

/// An ordered run of frames that all share one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoClip {
    frames: Vec<Frame>,
}

impl VideoClip {
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        let Some(first) = frames.first() else {
            bail!("a clip needs at least one frame");
        };
        let shape = first.shape();
        if let Some(bad) = frames.iter().position(|f| f.shape() != shape) {
            bail!(
                "frame {} has shape {:?}, expected {:?}",
                bad, frames[bad].shape(), shape
            );
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// [channels, height, width] of every frame
    pub fn frame_shape(&self) -> [usize; 3] {
        self.frames[0].shape()
    }

    pub fn box_downsample(&self, factor: usize) -> Result<VideoClip> {
        let frames = self.frames
            .iter()
            .map(|f| f.box_downsample(factor))
            .collect::<Result<Vec<_>>>()?;
        VideoClip::new(frames)
    }

    /// All pixels in [T, C, H, W] order
    pub fn to_flat(&self) -> Vec<f32> {
        self.frames
            .iter()
            .flat_map(|f| f.pixels.iter().copied())
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(channels: usize, size: usize) -> Frame {
        let pixels = (0..channels * size * size).map(|i| i as f32).collect();
        Frame::new(channels, size, size, pixels).unwrap()
    }

    #[test]
    fn test_rejects_wrong_pixel_count() {
        assert!(Frame::new(3, 2, 2, vec![0.0; 11]).is_err());
    }

    #[test]
    fn test_box_downsample_averages_blocks() {
        // 1×4×4 ramp 0..16, 2×2 blocks
        let lr = ramp(1, 4).box_downsample(2).unwrap();
        assert_eq!(lr.shape(), [1, 2, 2]);
        assert_eq!(lr.pixels(), &[2.5, 4.5, 10.5, 12.5]);
    }

    #[test]
    fn test_box_downsample_rejects_uneven_factor() {
        assert!(ramp(1, 6).box_downsample(4).is_err());
        assert!(ramp(1, 4).box_downsample(0).is_err());
    }

    #[test]
    fn test_clip_requires_uniform_shapes() {
        assert!(VideoClip::new(vec![]).is_err());
        assert!(VideoClip::new(vec![ramp(1, 4), ramp(1, 2)]).is_err());

        let clip = VideoClip::new(vec![ramp(3, 4), ramp(3, 4)]).unwrap();
        assert_eq!(clip.len(), 2);
        assert_eq!(clip.frame_shape(), [3, 4, 4]);
        assert_eq!(clip.to_flat().len(), 2 * 3 * 16);
    }
}
