// ============================================================
// Layer 5 — Shared Blocks
// ============================================================
// The four building blocks the networks are assembled from:
//
//   DownBlock          conv → lrelu → conv → lrelu → maxpool
//   UpBlock            conv → lrelu → conv → lrelu → bilinear x2
//   ResidualBlock      conv → relu → conv (no bias)
//   DiscriminatorBlock conv (no bias) → batchnorm → lrelu
//
// ResidualBlock returns only the branch. Whether the identity
// shortcut is added is the caller's decision, because the
// discriminator has stages that change channel count.

use burn::{
    nn::{conv::Conv2d, pool::MaxPool2d, BatchNorm, LeakyRelu, Relu},
    prelude::*,
};

use crate::ml::layers::{batchnorm, conv2, lrelu, maxpool, upsample2x, LRELU_SLOPE};

// ─── DownBlock ────────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct DownBlockConfig {
    pub in_channels:  usize,
    pub out_channels: usize,
    #[config(default = 1)]
    pub stride:       usize,
}

impl DownBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DownBlock<B> {
        DownBlock {
            conv1: conv2(self.in_channels, 3, self.out_channels, self.stride, true, device),
            conv2: conv2(self.out_channels, 3, self.out_channels, self.stride, true, device),
            act:   lrelu(LRELU_SLOPE),
            pool:  maxpool(),
        }
    }
}

#[derive(Module, Debug)]
pub struct DownBlock<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub act:   LeakyRelu,
    pub pool:  MaxPool2d,
}

impl<B: Backend> DownBlock<B> {
    /// [N, in, H, W] → [N, out, H/2, W/2]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.act.forward(self.conv1.forward(x));
        let x = self.act.forward(self.conv2.forward(x));
        self.pool.forward(x)
    }
}

// ─── UpBlock ──────────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct UpBlockConfig {
    pub in_channels:  usize,
    pub out_channels: usize,
    #[config(default = 1)]
    pub stride:       usize,
}

impl UpBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> UpBlock<B> {
        UpBlock {
            conv1: conv2(self.in_channels, 3, self.out_channels, self.stride, true, device),
            conv2: conv2(self.out_channels, 3, self.out_channels, self.stride, true, device),
            act:   lrelu(LRELU_SLOPE),
        }
    }
}

#[derive(Module, Debug)]
pub struct UpBlock<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub act:   LeakyRelu,
}

impl<B: Backend> UpBlock<B> {
    /// [N, in, H, W] → [N, out, 2H, 2W]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.act.forward(self.conv1.forward(x));
        let x = self.act.forward(self.conv2.forward(x));
        upsample2x(x)
    }
}

// ─── ResidualBlock ────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct ResidualBlockConfig {
    pub in_channels:  usize,
    pub out_channels: usize,
    #[config(default = 1)]
    pub stride:       usize,
}

impl ResidualBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResidualBlock<B> {
        ResidualBlock {
            conv1: conv2(self.in_channels, 3, self.out_channels, self.stride, true, device),
            relu:  Relu::new(),
            conv2: conv2(self.out_channels, 3, self.out_channels, self.stride, false, device),
            identity_shortcut: self.in_channels == self.out_channels && self.stride == 1,
        }
    }
}

#[derive(Module, Debug)]
pub struct ResidualBlock<B: Backend> {
    pub conv1: Conv2d<B>,
    pub relu:  Relu,
    pub conv2: Conv2d<B>,
    /// True when input and output shapes match, so x + branch(x) is defined
    pub identity_shortcut: bool,
}

impl<B: Backend> ResidualBlock<B> {
    /// The residual branch only.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.relu.forward(self.conv1.forward(x));
        self.conv2.forward(x)
    }

    /// branch(x) + x
    ///
    /// # Panics
    /// If the block changes channel count or resolution.
    pub fn forward_residual(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        assert!(
            self.identity_shortcut,
            "identity shortcut requires matching input/output shapes"
        );
        self.forward(x.clone()) + x
    }
}

// ─── DiscriminatorBlock ───────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct DiscriminatorBlockConfig {
    pub in_channels:  usize,
    pub out_channels: usize,
    pub kernel_size:  usize,
    pub stride:       usize,
}

impl DiscriminatorBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DiscriminatorBlock<B> {
        DiscriminatorBlock {
            conv: conv2(self.in_channels, self.kernel_size, self.out_channels, self.stride, false, device),
            norm: batchnorm(self.out_channels, device),
            act:  lrelu(LRELU_SLOPE),
        }
    }
}

#[derive(Module, Debug)]
pub struct DiscriminatorBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B, 2>,
    pub act:  LeakyRelu,
}

impl<B: Backend> DiscriminatorBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.act.forward(self.norm.forward(self.conv.forward(x)))
    }
}
