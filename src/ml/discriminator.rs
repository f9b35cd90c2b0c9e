// ============================================================
// Layer 5 — Discriminator
// ============================================================
// stem     conv(in → 64) + lrelu
// pyramid  5 × DiscriminatorBlock (k=4, s=2), each halves H, W
//            64→64, 64→64, 64→128, 128→256, 256→256
//          every pyramid output is kept as a feature map
// stages   residual + batchnorm + lrelu
//            256→256 (+x), 256→256 (+x), 256→128,
//            128→128 (+x), 128→3
// head     flatten → dense → sigmoid
//
// After five halvings a crop of size S leaves a 3 × S/32 × S/32
// tensor, so the dense layer sees 3·(S/32)² features (48 at 128).

use burn::{
    nn::{conv::Conv2d, BatchNorm, LeakyRelu, Linear},
    prelude::*,
    tensor::activation::sigmoid,
};

use crate::ml::blocks::{
    DiscriminatorBlock, DiscriminatorBlockConfig, ResidualBlock, ResidualBlockConfig,
};
use crate::ml::layers::{batchnorm, conv2, dense, lrelu, LRELU_SLOPE};

const STEM_CHANNELS: usize = 64;

/// (in, out) channels of the strided pyramid blocks
const PYRAMID: [(usize, usize); 5] = [(64, 64), (64, 64), (64, 128), (128, 256), (256, 256)];

/// (in, out) channels of the residual stages
const STAGES: [(usize, usize); 5] = [(256, 256), (256, 256), (256, 128), (128, 128), (128, 3)];

#[derive(Config, Debug)]
pub struct DiscriminatorConfig {
    /// Channels of the conditioned triplet input
    #[config(default = 27)]
    pub in_channels: usize,
    /// Height and width of the (square) input crop
    #[config(default = 128)]
    pub crop_size:   usize,
}

impl DiscriminatorConfig {
    /// Total stride of the pyramid
    pub const DOWNSCALE: usize = 1 << PYRAMID.len();

    /// Number of features entering the dense classifier
    pub fn dense_features(&self) -> usize {
        let side = self.crop_size / Self::DOWNSCALE;
        STAGES[STAGES.len() - 1].1 * side * side
    }

    /// # Panics
    /// If `crop_size` is zero or not a multiple of 32.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Discriminator<B> {
        assert!(
            self.crop_size > 0 && self.crop_size % Self::DOWNSCALE == 0,
            "discriminator crop size must be a positive multiple of {}, got {}",
            Self::DOWNSCALE,
            self.crop_size,
        );

        let pyramid = PYRAMID
            .iter()
            .map(|&(i, o)| DiscriminatorBlockConfig::new(i, o, 4, 2).init(device))
            .collect();
        let stages = STAGES
            .iter()
            .map(|&(i, o)| ResidualStage {
                block: ResidualBlockConfig::new(i, o).init(device),
                norm:  batchnorm(o, device),
            })
            .collect();

        Discriminator {
            stem:    conv2(self.in_channels, 3, STEM_CHANNELS, 1, true, device),
            act:     lrelu(LRELU_SLOPE),
            pyramid,
            stages,
            fc:      dense(self.dense_features(), 1, device),
        }
    }
}

/// Residual block followed by batch normalisation. The identity
/// shortcut is used only when the block keeps its channel count.
#[derive(Module, Debug)]
pub struct ResidualStage<B: Backend> {
    pub block: ResidualBlock<B>,
    pub norm:  BatchNorm<B, 2>,
}

impl<B: Backend> ResidualStage<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let y = if self.block.identity_shortcut {
            self.block.forward_residual(x)
        } else {
            self.block.forward(x)
        };
        self.norm.forward(y)
    }
}

#[derive(Module, Debug)]
pub struct Discriminator<B: Backend> {
    pub stem:    Conv2d<B>,
    pub act:     LeakyRelu,
    pub pyramid: Vec<DiscriminatorBlock<B>>,
    pub stages:  Vec<ResidualStage<B>>,
    pub fc:      Linear<B>,
}

pub struct DiscriminatorOutput<B: Backend> {
    /// Probability that each sample is real — shape [N, 1]
    pub probability: Tensor<B, 2>,
    /// Output of every pyramid block, shallowest first
    pub features:    Vec<Tensor<B, 4>>,
}

impl<B: Backend> Discriminator<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> DiscriminatorOutput<B> {
        let mut net      = self.act.forward(self.stem.forward(x));
        let mut features = Vec::with_capacity(self.pyramid.len());

        for block in &self.pyramid {
            net = block.forward(net);
            features.push(net.clone());
        }
        for stage in &self.stages {
            net = self.act.forward(stage.forward(net));
        }

        let logits = self.fc.forward(net.flatten::<2>(1, 3));
        DiscriminatorOutput {
            probability: sigmoid(logits),
            features,
        }
    }
}
