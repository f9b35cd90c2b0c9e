// ============================================================
// Layer 5 — Generator (x4 super-resolution)
// ============================================================
// stem       conv(in → 64) + relu
// body       num_resblock × (x + residual(x))
// upsample   conv_tran(64 → 128, s2) + relu
//            conv_tran(128 → 128, s2) + relu
//            conv(128 → 64) + relu
// output     conv(64 → out_channels)
//
// The two stride-2 transposed convolutions give a x4 output.
// The default 51 input channels are one RGB low-res frame plus
// the space-to-depth of the previous x4 output (3 + 3·4·4).

use burn::{
    nn::{
        conv::{Conv2d, ConvTranspose2d},
        Relu,
    },
    prelude::*,
};

use crate::ml::blocks::{ResidualBlock, ResidualBlockConfig};
use crate::ml::layers::{conv2, conv2_tran};

const FEATURES:    usize = 64;
const UP_FEATURES: usize = 128;

/// Output height/width divided by input height/width
pub const UPSCALE: usize = 4;

// The residual depth and output channels have no defaults:
// a generator cannot be built without choosing them.
#[derive(Config, Debug)]
pub struct GeneratorConfig {
    pub out_channels: usize,
    pub num_resblock: usize,
    #[config(default = 51)]
    pub in_channels:  usize,
}

impl GeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        let resblocks = (0..self.num_resblock)
            .map(|_| ResidualBlockConfig::new(FEATURES, FEATURES).init(device))
            .collect();

        Generator {
            stem:      conv2(self.in_channels, 3, FEATURES, 1, true, device),
            resblocks,
            up1:       conv2_tran(FEATURES, 3, UP_FEATURES, 2, 1, device),
            up2:       conv2_tran(UP_FEATURES, 3, UP_FEATURES, 2, 1, device),
            up_conv:   conv2(UP_FEATURES, 3, FEATURES, 1, true, device),
            output:    conv2(FEATURES, 3, self.out_channels, 1, true, device),
            relu:      Relu::new(),
        }
    }
}

#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    pub stem:      Conv2d<B>,
    pub resblocks: Vec<ResidualBlock<B>>,
    pub up1:       ConvTranspose2d<B>,
    pub up2:       ConvTranspose2d<B>,
    pub up_conv:   Conv2d<B>,
    pub output:    Conv2d<B>,
    pub relu:      Relu,
}

impl<B: Backend> Generator<B> {
    /// [N, in_channels, h, w] → [N, out_channels, 4h, 4w]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut net = self.relu.forward(self.stem.forward(x));

        for block in &self.resblocks {
            net = block.forward_residual(net);
        }

        let net = self.relu.forward(self.up1.forward(net));
        let net = self.relu.forward(self.up2.forward(net));
        let net = self.relu.forward(self.up_conv.forward(net));
        self.output.forward(net)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::module::Param;

    type TestBackend = NdArray;

    #[test]
    fn test_upscales_by_four() {
        let device = Default::default();
        let gen    = GeneratorConfig::new(3, 2).init::<TestBackend>(&device);
        let x      = Tensor::<TestBackend, 4>::ones([2, 51, 8, 6], &device);
        assert_eq!(gen.forward(x).dims(), [2, 3, 32, 24]);
    }

    #[test]
    fn test_resblock_count_follows_config() {
        let device = Default::default();
        let gen    = GeneratorConfig::new(3, 5).init::<TestBackend>(&device);
        assert_eq!(gen.resblocks.len(), 5);
        assert!(gen.resblocks.iter().all(|b| b.identity_shortcut));
    }

    #[test]
    fn test_zero_resblocks_still_upscales() {
        let device = Default::default();
        let gen    = GeneratorConfig::new(1, 0)
            .with_in_channels(3)
            .init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::zeros([1, 3, 4, 4], &device);
        assert_eq!(gen.forward(x).dims(), [1, 1, 16, 16]);
    }

    #[test]
    fn test_resblock_with_silent_branch_is_identity() {
        // zeroing the last conv of the only block leaves just the shortcut,
        // so the body must pass the stem output through unchanged
        let device  = Default::default();
        let mut gen = GeneratorConfig::new(3, 1).init::<TestBackend>(&device);
        let dims    = gen.resblocks[0].conv2.weight.dims();
        gen.resblocks[0].conv2.weight = Param::from_tensor(Tensor::zeros(dims, &device));

        let mut bodyless = gen.clone();
        bodyless.resblocks.clear();

        let x = Tensor::<TestBackend, 4>::random(
            [1, 51, 4, 4], burn::tensor::Distribution::Uniform(0.0, 1.0), &device,
        );
        let with_block: Vec<f32> = gen.forward(x.clone()).into_data().to_vec().unwrap();
        let without:    Vec<f32> = bodyless.forward(x).into_data().to_vec().unwrap();
        for (a, b) in with_block.iter().zip(without.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_parameter_count_grows_per_resblock() {
        // one residual block: 64·64·9 + 64 (conv1) + 64·64·9 (conv2, no bias)
        let device = Default::default();
        let small  = GeneratorConfig::new(3, 1).init::<TestBackend>(&device);
        let large  = GeneratorConfig::new(3, 2).init::<TestBackend>(&device);
        assert_eq!(large.num_params() - small.num_params(), 2 * 64 * 64 * 9 + 64);
    }
}
