// ============================================================
// Layer 5 — FNet (flow estimation network)
// ============================================================
// U-Net shaped encoder/decoder without skip connections:
//
//   in ─► down(32) ─► down(64) ─► down(128) ─► down(256)
//                                                 │
//   flow ◄─ head ◄─ up(64) ◄─ up(128) ◄─ up(256) ◄─ up(512)
//
// Each down block halves H and W, each up block doubles them,
// so the flow field has the input's resolution. H and W must be
// multiples of 16.
//
// The head output goes through tanh and is scaled by max_flow,
// bounding every displacement to (-max_flow, max_flow) pixels.

use burn::{
    nn::{conv::Conv2d, LeakyRelu},
    prelude::*,
};

use crate::ml::blocks::{DownBlock, DownBlockConfig, UpBlock, UpBlockConfig};
use crate::ml::layers::{conv2, lrelu, LRELU_SLOPE};

const DOWN_CHANNELS: [usize; 4] = [32, 64, 128, 256];
const UP_CHANNELS:   [usize; 4] = [512, 256, 128, 64];

/// Number of channels in the flow field (dx, dy)
pub const FLOW_CHANNELS: usize = 2;

#[derive(Config, Debug)]
pub struct FNetConfig {
    /// Channels of the stacked input frames
    #[config(default = 3)]
    pub in_channels: usize,
    /// Largest displacement (in pixels) the network can emit
    #[config(default = 24.0)]
    pub max_flow:    f64,
}

impl FNetConfig {
    /// Input height and width must be a multiple of this
    pub const SPATIAL_MULTIPLE: usize = 1 << DOWN_CHANNELS.len();

    pub fn init<B: Backend>(&self, device: &B::Device) -> FNet<B> {
        let mut in_ch = self.in_channels;
        let down = DOWN_CHANNELS
            .iter()
            .map(|&out| {
                let block = DownBlockConfig::new(in_ch, out).init(device);
                in_ch = out;
                block
            })
            .collect();
        let up = UP_CHANNELS
            .iter()
            .map(|&out| {
                let block = UpBlockConfig::new(in_ch, out).init(device);
                in_ch = out;
                block
            })
            .collect();

        FNet {
            down,
            up,
            head_conv1: conv2(in_ch, 3, 32, 1, true, device),
            head_act:   lrelu(LRELU_SLOPE),
            head_conv2: conv2(32, 3, FLOW_CHANNELS, 1, true, device),
            max_flow:   self.max_flow,
        }
    }
}

#[derive(Module, Debug)]
pub struct FNet<B: Backend> {
    pub down:       Vec<DownBlock<B>>,
    pub up:         Vec<UpBlock<B>>,
    pub head_conv1: Conv2d<B>,
    pub head_act:   LeakyRelu,
    pub head_conv2: Conv2d<B>,
    pub max_flow:   f64,
}

impl<B: Backend> FNet<B> {
    /// [N, in_channels, H, W] → flow [N, 2, H, W]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, _, h, w] = x.dims();
        assert!(
            h % FNetConfig::SPATIAL_MULTIPLE == 0 && w % FNetConfig::SPATIAL_MULTIPLE == 0,
            "FNet input {}x{} must be a multiple of {} in both dimensions",
            h, w, FNetConfig::SPATIAL_MULTIPLE,
        );

        let mut net = x;
        for block in &self.down {
            net = block.forward(net);
        }
        for block in &self.up {
            net = block.forward(net);
        }
        let net = self.head_act.forward(self.head_conv1.forward(net));
        let net = self.head_conv2.forward(net);
        net.tanh() * self.max_flow
    }
}
