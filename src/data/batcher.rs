// ============================================================
// Layer 4 — Clip Batcher
// ============================================================
// Implements Burn's Batcher trait to stack ClipSamples into
// 5-D tensors:
//
//   lr: [batch, frames, channels, h, w]
//   hr: [batch, frames, channels, 4h, 4w]
//
// All samples come from one generator config, so every sample
// already has the same shape and stacking is a flat concat.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::ClipSample;

// ─── ClipBatch ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ClipBatch<B: Backend> {
    /// Low-res frames — shape: [batch, frames, channels, h, w]
    pub lr: Tensor<B, 5>,

    /// High-res frames — shape: [batch, frames, channels, H, W]
    pub hr: Tensor<B, 5>,
}

impl<B: Backend> ClipBatch<B> {
    pub fn frame_count(&self) -> usize {
        self.lr.dims()[1]
    }

    pub fn lr_frame(&self, t: usize) -> Tensor<B, 4> {
        frame_at(&self.lr, t)
    }

    pub fn hr_frame(&self, t: usize) -> Tensor<B, 4> {
        frame_at(&self.hr, t)
    }

    pub fn lr_frames(&self) -> Vec<Tensor<B, 4>> {
        (0..self.frame_count()).map(|t| self.lr_frame(t)).collect()
    }

    pub fn hr_frames(&self) -> Vec<Tensor<B, 4>> {
        (0..self.frame_count()).map(|t| self.hr_frame(t)).collect()
    }
}

/// Slice frame t out of a [N, T, C, H, W] tensor
fn frame_at<B: Backend>(clips: &Tensor<B, 5>, t: usize) -> Tensor<B, 4> {
    let [n, _, c, h, w] = clips.dims();
    clips
        .clone()
        .slice([0..n, t..t + 1, 0..c, 0..h, 0..w])
        .reshape([n, c, h, w])
}

// ─── ClipBatcher ──────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct ClipBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClipBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ClipSample, ClipBatch<B>> for ClipBatcher<B> {
    fn batch(&self, items: Vec<ClipSample>) -> ClipBatch<B> {
        let batch_size = items.len();
        let [t, c, h, w]     = items[0].lr_dims();
        let [_, _, hh, hw]   = items[0].hr_dims();

        let lr_flat: Vec<f32> = items.iter().flat_map(|s| s.lr.iter().copied()).collect();
        let hr_flat: Vec<f32> = items.iter().flat_map(|s| s.hr.iter().copied()).collect();

        let lr = Tensor::<B, 5>::from_data(
            TensorData::new(lr_flat, [batch_size, t, c, h, w]),
            &self.device,
        );
        let hr = Tensor::<B, 5>::from_data(
            TensorData::new(hr_flat, [batch_size, t, c, hh, hw]),
            &self.device,
        );

        ClipBatch { lr, hr }
    }
}
