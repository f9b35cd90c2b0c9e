// ============================================================
// Layer 5 — Low-level Layer Constructors
// ============================================================
// Thin helpers around burn::nn so every network builds its
// convolutions the same way.
//
// Padding rule: (kernel_size - 1) / 2 on every side.
//   k=3, stride 1 → same spatial size
//   k=4, stride 2 → exactly half the spatial size
//
// Burn's PaddingConfig2d::Same rejects even kernels, so the
// padding is always given explicitly.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig,
        LeakyRelu, LeakyReluConfig,
        Linear, LinearConfig,
        PaddingConfig2d,
    },
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

/// Negative slope used by every leaky ReLU in the three networks
pub const LRELU_SLOPE: f64 = 0.2;

/// Padding applied on each side for a square kernel
pub fn conv_padding(kernel_size: usize) -> usize {
    kernel_size.saturating_sub(1) / 2
}

/// Square-kernel 2D convolution with explicit padding.
pub fn conv2<B: Backend>(
    in_channels:  usize,
    kernel_size:  usize,
    out_channels: usize,
    stride:       usize,
    use_bias:     bool,
    device:       &B::Device,
) -> Conv2d<B> {
    let pad = conv_padding(kernel_size);
    Conv2dConfig::new([in_channels, out_channels], [kernel_size, kernel_size])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(pad, pad))
        .with_bias(use_bias)
        .init(device)
}

/// Transposed convolution. With k=3, stride 2, output_padding 1
/// the output is exactly twice the input height and width.
pub fn conv2_tran<B: Backend>(
    in_channels:    usize,
    kernel_size:    usize,
    out_channels:   usize,
    stride:         usize,
    output_padding: usize,
    device:         &B::Device,
) -> ConvTranspose2d<B> {
    let pad = conv_padding(kernel_size);
    ConvTranspose2dConfig::new([in_channels, out_channels], [kernel_size, kernel_size])
        .with_stride([stride, stride])
        .with_padding([pad, pad])
        .with_padding_out([output_padding, output_padding])
        .init(device)
}

pub fn lrelu(negative_slope: f64) -> LeakyRelu {
    LeakyReluConfig::new()
        .with_negative_slope(negative_slope)
        .init()
}

/// 2x2 max pooling with stride 2, halving height and width
pub fn maxpool() -> MaxPool2d {
    MaxPool2dConfig::new([2, 2])
        .with_strides([2, 2])
        .init()
}

/// Batch normalisation over the channel axis of NCHW tensors.
/// Burn defaults (eps 1e-5, momentum 0.1) match the usual setup.
pub fn batchnorm<B: Backend>(channels: usize, device: &B::Device) -> BatchNorm<B, 2> {
    BatchNormConfig::new(channels).init(device)
}

pub fn dense<B: Backend>(in_features: usize, out_features: usize, device: &B::Device) -> Linear<B> {
    LinearConfig::new(in_features, out_features).init(device)
}

/// Bilinear resize to twice the height and width.
pub fn upsample2x<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [_, _, h, w] = x.dims();
    resize_bilinear(x, [h * 2, w * 2])
}

pub fn resize_bilinear<B: Backend>(x: Tensor<B, 4>, size: [usize; 2]) -> Tensor<B, 4> {
    interpolate(x, size, InterpolateOptions::new(InterpolateMode::Bilinear))
}
