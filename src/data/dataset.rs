use anyhow::{ensure, Result};
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::frame::VideoClip;

/// One training clip: high-res frames and their box-downsampled
/// low-res counterparts, both flattened in [T, C, H, W] order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSample {
    pub frames:   usize,
    pub channels: usize,
    pub lr_size:  usize,
    pub hr_size:  usize,
    pub lr:       Vec<f32>,
    pub hr:       Vec<f32>,
}

impl ClipSample {
    /// Build a sample from a square high-res clip.
    pub fn from_clip(hr_clip: &VideoClip, scale: usize) -> Result<Self> {
        let [channels, h, w] = hr_clip.frame_shape();
        ensure!(h == w, "training clips must be square, got {h}x{w}");

        let lr_clip = hr_clip.box_downsample(scale)?;
        Ok(Self {
            frames:  hr_clip.len(),
            channels,
            lr_size: h / scale,
            hr_size: h,
            lr:      lr_clip.to_flat(),
            hr:      hr_clip.to_flat(),
        })
    }

    pub fn lr_dims(&self) -> [usize; 4] {
        [self.frames, self.channels, self.lr_size, self.lr_size]
    }

    pub fn hr_dims(&self) -> [usize; 4] {
        [self.frames, self.channels, self.hr_size, self.hr_size]
    }
}

pub struct ClipDataset {
    samples: Vec<ClipSample>,
}

impl ClipDataset {
    pub fn new(samples: Vec<ClipSample>) -> Self { Self { samples } }
}

impl Dataset<ClipSample> for ClipDataset {
    fn get(&self, index: usize) -> Option<ClipSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::SyntheticClipSource;
    use crate::domain::traits::ClipSource;

    #[test]
    fn test_sample_from_clip() {
        let clips  = SyntheticClipSource::new(1, 3, 32, 0).load_all().unwrap();
        let sample = ClipSample::from_clip(&clips[0], 4).unwrap();

        assert_eq!(sample.lr_dims(), [3, 3, 8, 8]);
        assert_eq!(sample.hr_dims(), [3, 3, 32, 32]);
        assert_eq!(sample.lr.len(), 3 * 3 * 8 * 8);
        assert_eq!(sample.hr.len(), 3 * 3 * 32 * 32);
    }

    #[test]
    fn test_dataset_access() {
        let clips   = SyntheticClipSource::new(3, 3, 16, 0).load_all().unwrap();
        let samples = clips
            .iter()
            .map(|c| ClipSample::from_clip(c, 4))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let dataset = ClipDataset::new(samples);

        assert_eq!(dataset.len(), 3);
        assert!(dataset.get(2).is_some());
        assert!(dataset.get(3).is_none());
    }
}
