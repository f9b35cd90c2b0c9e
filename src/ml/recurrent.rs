// ============================================================
// Layer 5 — Frame-Recurrent Generator
// ============================================================
// Wraps FNet and the Generator into one Module so a single
// optimiser updates both. For each frame t of a low-res clip:
//
//   t = 0   prev_hr = zeros, flow = zeros
//   t ≥ 1   flow_t  = fnet([lr_t, lr_{t-1}])
//           prev_hr = output_{t-1}
//
//   output_t = generator(generator_input(lr_t, prev_hr, flow_t))
//
// FNet sees the current and previous frame stacked on the channel
// axis, so it is built with 2 × image channels.

use burn::prelude::*;

use crate::ml::fnet::{FNet, FNetConfig, FLOW_CHANNELS};
use crate::ml::generator::{Generator, GeneratorConfig, UPSCALE};
use crate::ml::layers::resize_bilinear;
use crate::ml::warp::{backward_warp, generator_input, upscale_flow};

/// Frames per training clip; the discriminator judges triplets
pub const CLIP_FRAMES: usize = 3;

#[derive(Config, Debug)]
pub struct FrameRecurrentConfig {
    pub num_resblock:   usize,
    #[config(default = 3)]
    pub image_channels: usize,
    #[config(default = 24.0)]
    pub max_flow:       f64,
}

impl FrameRecurrentConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FrameRecurrentGenerator<B> {
        let c = self.image_channels;
        FrameRecurrentGenerator {
            fnet: FNetConfig::new()
                .with_in_channels(2 * c)
                .with_max_flow(self.max_flow)
                .init(device),
            generator: GeneratorConfig::new(c, self.num_resblock)
                .with_in_channels(c + UPSCALE * UPSCALE * c)
                .init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct FrameRecurrentGenerator<B: Backend> {
    pub fnet:      FNet<B>,
    pub generator: Generator<B>,
}

pub struct ClipOutput<B: Backend> {
    /// One high-res frame per input frame
    pub frames: Vec<Tensor<B, 4>>,
    /// Low-res flow from frame t-1 to frame t, for t ≥ 1
    pub flows:  Vec<Tensor<B, 4>>,
}

impl<B: Backend> FrameRecurrentGenerator<B> {
    /// Flow that warps `previous` onto `current` (both low-res).
    pub fn estimate_flow(&self, current: Tensor<B, 4>, previous: Tensor<B, 4>) -> Tensor<B, 4> {
        self.fnet.forward(Tensor::cat(vec![current, previous], 1))
    }

    /// Super-resolve one frame given the previous high-res output.
    pub fn step(
        &self,
        lr_cur:  Tensor<B, 4>,
        prev_hr: Tensor<B, 4>,
        flow_lr: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        self.generator.forward(generator_input(lr_cur, prev_hr, flow_lr, UPSCALE))
    }

    /// Run the recurrence over a clip of low-res frames [N, C, h, w].
    pub fn forward_clip(&self, lr_frames: &[Tensor<B, 4>]) -> ClipOutput<B> {
        let mut frames: Vec<Tensor<B, 4>> = Vec::with_capacity(lr_frames.len());
        let mut flows: Vec<Tensor<B, 4>>  = Vec::with_capacity(lr_frames.len().saturating_sub(1));

        for (t, lr) in lr_frames.iter().enumerate() {
            let [n, c, h, w] = lr.dims();
            let device       = lr.device();

            let (prev_hr, flow) = if t == 0 {
                (
                    Tensor::zeros([n, c, h * UPSCALE, w * UPSCALE], &device),
                    Tensor::zeros([n, FLOW_CHANNELS, h, w], &device),
                )
            } else {
                let flow = self.estimate_flow(lr.clone(), lr_frames[t - 1].clone());
                flows.push(flow.clone());
                (frames[t - 1].clone(), flow)
            };

            frames.push(self.step(lr.clone(), prev_hr, flow));
        }

        ClipOutput { frames, flows }
    }
}

/// Discriminator input for a triplet of high-res frames:
///
///   [hr_0, hr_1, hr_2]                       candidate triplet
///   [up(lr_0), up(lr_1), up(lr_2)]           conditioning
///   [warp(hr_0, f_0→1), hr_1, warp(hr_2, f_2→1)]  aligned triplet
///
/// `flow_prev` maps frame 0 onto frame 1 and `flow_next` maps
/// frame 2 onto frame 1 (both low-res). Flows are detached so the
/// adversarial signal never trains FNet through alignment.
pub fn discriminator_input<B: Backend>(
    hr:        &[Tensor<B, 4>],
    lr:        &[Tensor<B, 4>],
    flow_prev: Tensor<B, 4>,
    flow_next: Tensor<B, 4>,
) -> Tensor<B, 4> {
    assert_eq!(hr.len(), CLIP_FRAMES, "discriminator judges frame triplets");
    assert_eq!(lr.len(), CLIP_FRAMES, "discriminator judges frame triplets");

    let [_, _, hh, hw] = hr[0].dims();
    let flow_prev = upscale_flow(flow_prev.detach(), UPSCALE);
    let flow_next = upscale_flow(flow_next.detach(), UPSCALE);

    let mut parts: Vec<Tensor<B, 4>> = hr.to_vec();
    parts.extend(lr.iter().map(|f| resize_bilinear(f.clone(), [hh, hw])));
    parts.push(backward_warp(hr[0].clone(), flow_prev));
    parts.push(hr[1].clone());
    parts.push(backward_warp(hr[2].clone(), flow_next));

    Tensor::cat(parts, 1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    fn clip(n: usize, size: usize) -> Vec<Tensor<TestBackend, 4>> {
        let device: <TestBackend as Backend>::Device = Default::default();
        (0..CLIP_FRAMES)
            .map(|_| Tensor::random([n, 3, size, size], Distribution::Uniform(0.0, 1.0), &device))
            .collect()
    }

    #[test]
    fn test_channel_wiring() {
        let device = Default::default();
        let model  = FrameRecurrentConfig::new(1).init::<TestBackend>(&device);
        assert_eq!(model.fnet.down[0].conv1.weight.dims()[1], 6);
        assert_eq!(model.generator.stem.weight.dims()[1],     51);
    }

    #[test]
    fn test_forward_clip_shapes() {
        let device = Default::default();
        let model  = FrameRecurrentConfig::new(1).init::<TestBackend>(&device);
        let out    = model.forward_clip(&clip(2, 16));

        assert_eq!(out.frames.len(), CLIP_FRAMES);
        assert_eq!(out.flows.len(),  CLIP_FRAMES - 1);
        assert!(out.frames.iter().all(|f| f.dims() == [2, 3, 64, 64]));
        assert!(out.flows.iter().all(|f| f.dims() == [2, 2, 16, 16]));
    }

    fn assert_close(a: Tensor<TestBackend, 4>, b: Tensor<TestBackend, 4>) {
        assert_eq!(a.dims(), b.dims());
        let a: Vec<f32> = a.into_data().to_vec().unwrap();
        let b: Vec<f32> = b.into_data().to_vec().unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5, "{x} != {y}");
        }
    }

    #[test]
    fn test_first_frame_starts_from_black() {
        let device = Default::default();
        let model  = FrameRecurrentConfig::new(1).init::<TestBackend>(&device);
        let lr     = clip(1, 16);
        let out    = model.forward_clip(&lr);

        let expected = model.step(
            lr[0].clone(),
            Tensor::zeros([1, 3, 64, 64], &device),
            Tensor::zeros([1, 2, 16, 16], &device),
        );
        assert_close(out.frames[0].clone(), expected);
    }

    #[test]
    fn test_later_frames_follow_previous_output() {
        let device = Default::default();
        let model  = FrameRecurrentConfig::new(1).init::<TestBackend>(&device);
        let lr     = clip(1, 16);
        let out    = model.forward_clip(&lr);

        for t in 1..CLIP_FRAMES {
            let flow = model.estimate_flow(lr[t].clone(), lr[t - 1].clone());
            assert_close(out.flows[t - 1].clone(), flow.clone());

            let expected = model.step(lr[t].clone(), out.frames[t - 1].clone(), flow);
            assert_close(out.frames[t].clone(), expected);
        }
    }

    #[test]
    fn test_discriminator_input_channel_order() {
        // constant frames stay constant under warping and resizing,
        // so every 3-channel group carries one recognisable value
        let device: <TestBackend as Backend>::Device = Default::default();
        let hr_vals = [0.1, 0.2, 0.3];
        let lr_vals = [0.6, 0.7, 0.8];
        let hr: Vec<Tensor<TestBackend, 4>> = hr_vals
            .iter()
            .map(|&v| Tensor::full([1, 3, 64, 64], v, &device))
            .collect();
        let lr: Vec<Tensor<TestBackend, 4>> = lr_vals
            .iter()
            .map(|&v| Tensor::full([1, 3, 16, 16], v, &device))
            .collect();
        let flow_prev = Tensor::<TestBackend, 4>::full([1, 2, 16, 16], 1.5, &device);
        let flow_next = Tensor::<TestBackend, 4>::full([1, 2, 16, 16], -2.0, &device);

        let input = discriminator_input(&hr, &lr, flow_prev, flow_next);

        let expected = [
            hr_vals[0], hr_vals[1], hr_vals[2],
            lr_vals[0], lr_vals[1], lr_vals[2],
            hr_vals[0], hr_vals[1], hr_vals[2],
        ];
        for (group, value) in expected.iter().enumerate() {
            let part: Vec<f32> = input
                .clone()
                .slice([0..1, group * 3..group * 3 + 3, 0..64, 0..64])
                .into_data()
                .to_vec()
                .unwrap();
            assert!(
                part.iter().all(|v| (v - *value as f32).abs() < 1e-5),
                "channel group {group} should hold {value}"
            );
        }
    }

    #[test]
    fn test_discriminator_input_has_27_channels() {
        let device = Default::default();
        let hr     = clip(1, 64);
        let lr     = clip(1, 16);
        let flow   = Tensor::<TestBackend, 4>::zeros([1, 2, 16, 16], &device);
        let input  = discriminator_input(&hr, &lr, flow.clone(), flow);
        assert_eq!(input.dims(), [1, 27, 64, 64]);
    }
}
