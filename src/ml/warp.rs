// ============================================================
// Layer 5 — Flow Utilities
// ============================================================
// Glue that turns an FNet flow field into generator and
// discriminator inputs:
//
//   backward_warp     sample an image at (x + dx, y + dy)
//   upscale_flow      resize a low-res flow to high-res pixels
//   space_to_depth    fold b×b pixel blocks into channels
//   generator_input   [lr_cur, s2d(warp(prev_hr, flow))]
//
// Flow channel 0 is the horizontal displacement, channel 1
// the vertical one, both in pixels of the image being warped.
//
// Why warp the previous output instead of feeding it directly?
//   The previous high-res frame shows the scene one step earlier.
//   Warping it with the estimated flow moves its detail to where
//   that detail sits in the current frame, so the generator can
//   copy it instead of re-inventing it every frame.
//
// Why space-to-depth?
//   The generator runs at low resolution. Folding each 4x4 block
//   of the warped high-res frame into 16 channels keeps every
//   pixel while matching the low-res grid (3 + 3·16 = 51 channels).

use burn::prelude::*;

use crate::ml::layers::resize_bilinear;

/// Bilinear backward warp with border clamping.
///
/// out[n, c, y, x] = image[n, c, y + flow[n, 1, y, x], x + flow[n, 0, y, x]]
///
/// A zero flow returns the image unchanged.
pub fn backward_warp<B: Backend>(image: Tensor<B, 4>, flow: Tensor<B, 4>) -> Tensor<B, 4> {
    let [n, c, h, w] = image.dims();
    let device       = image.device();

    let grid_x = Tensor::<B, 1, Int>::arange(0..w as i64, &device)
        .float()
        .reshape([1, 1, w])
        .expand([n, h, w]);
    let grid_y = Tensor::<B, 1, Int>::arange(0..h as i64, &device)
        .float()
        .reshape([1, h, 1])
        .expand([n, h, w]);

    let flow_x = flow.clone().slice([0..n, 0..1, 0..h, 0..w]).reshape([n, h, w]);
    let flow_y = flow.slice([0..n, 1..2, 0..h, 0..w]).reshape([n, h, w]);

    // Sample positions clamped to the image, so truncation is floor.
    let x = (grid_x + flow_x).clamp(0.0, (w - 1) as f64);
    let y = (grid_y + flow_y).clamp(0.0, (h - 1) as f64);

    let x0 = x.clone().int();
    let y0 = y.clone().int();
    let x1 = (x0.clone() + 1).clamp_max((w - 1) as i64);
    let y1 = (y0.clone() + 1).clamp_max((h - 1) as i64);

    let wx = (x - x0.clone().float()).reshape([n, 1, h, w]);
    let wy = (y - y0.clone().float()).reshape([n, 1, h, w]);

    let flat   = image.reshape([n, c, h * w]);
    let sample = |yi: Tensor<B, 3, Int>, xi: Tensor<B, 3, Int>| {
        let index = (yi * w as i64 + xi)
            .reshape([n, 1, h * w])
            .expand([n, c, h * w]);
        flat.clone().gather(2, index).reshape([n, c, h, w])
    };

    let top    = lerp(sample(y0.clone(), x0.clone()), sample(y0, x1.clone()), wx.clone());
    let bottom = lerp(sample(y1.clone(), x0), sample(y1, x1), wx);
    lerp(top, bottom, wy)
}

/// a·(1 − t) + b·t, with t broadcast over channels
fn lerp<B: Backend>(a: Tensor<B, 4>, b: Tensor<B, 4>, t: Tensor<B, 4>) -> Tensor<B, 4> {
    a.clone() + (b - a) * t
}

/// Resize a flow field by `scale` and rescale its vectors to
/// the new pixel grid.
pub fn upscale_flow<B: Backend>(flow: Tensor<B, 4>, scale: usize) -> Tensor<B, 4> {
    let [_, _, h, w] = flow.dims();
    resize_bilinear(flow, [h * scale, w * scale]) * scale as f64
}

/// [N, C, H·b, W·b] → [N, b·b·C, H, W]
///
/// Output channel (dy·b + dx)·C + c holds pixel (y·b + dy, x·b + dx)
/// of input channel c.
pub fn space_to_depth<B: Backend>(x: Tensor<B, 4>, block: usize) -> Tensor<B, 4> {
    let [n, c, hb, wb] = x.dims();
    assert!(
        hb % block == 0 && wb % block == 0,
        "spatial size {hb}x{wb} is not divisible by block {block}"
    );
    let (h, w) = (hb / block, wb / block);

    x.reshape([n, c, h, block, w, block])
        .permute([0, 3, 5, 1, 2, 4])
        .reshape([n, block * block * c, h, w])
}

/// Inverse of [`space_to_depth`].
pub fn depth_to_space<B: Backend>(x: Tensor<B, 4>, block: usize) -> Tensor<B, 4> {
    let [n, cbb, h, w] = x.dims();
    assert!(
        cbb % (block * block) == 0,
        "{cbb} channels cannot be unfolded with block {block}"
    );
    let c = cbb / (block * block);

    x.reshape([n, block, block, c, h, w])
        .permute([0, 3, 4, 1, 5, 2])
        .reshape([n, c, h * block, w * block])
}

/// Generator input for one recurrent step:
/// the current low-res frame next to the previous high-res
/// estimate, motion-compensated and folded back to low-res.
///
/// Channels: C + scale²·C (51 for RGB at x4).
pub fn generator_input<B: Backend>(
    lr_cur:  Tensor<B, 4>,
    prev_hr: Tensor<B, 4>,
    flow_lr: Tensor<B, 4>,
    scale:   usize,
) -> Tensor<B, 4> {
    let flow_hr = upscale_flow(flow_lr, scale);
    let warped  = backward_warp(prev_hr, flow_hr);
    Tensor::cat(vec![lr_cur, space_to_depth(warped, scale)], 1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::{Distribution, TensorData};

    type TestBackend = NdArray;

    fn ramp(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
        // 1×1×4×4 image where pixel (y, x) = 10·y + x
        let values: Vec<f32> = (0..4)
            .flat_map(|y| (0..4).map(move |x| (10 * y + x) as f32))
            .collect();
        Tensor::from_data(TensorData::new(values, [1, 1, 4, 4]), device)
    }

    fn constant_flow(dx: f32, dy: f32, device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
        let fx = Tensor::<TestBackend, 4>::ones([1, 1, 4, 4], device) * dx;
        let fy = Tensor::<TestBackend, 4>::ones([1, 1, 4, 4], device) * dy;
        Tensor::cat(vec![fx, fy], 1)
    }

    fn values(t: Tensor<TestBackend, 4>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_zero_flow_is_identity() {
        let device = Default::default();
        let image  = Tensor::<TestBackend, 4>::random(
            [2, 3, 8, 8], Distribution::Uniform(0.0, 1.0), &device,
        );
        let flow   = Tensor::<TestBackend, 4>::zeros([2, 2, 8, 8], &device);
        let warped = backward_warp(image.clone(), flow);

        for (a, b) in values(image).iter().zip(values(warped).iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_integer_shift_samples_neighbour() {
        let device = Default::default();
        let out    = values(backward_warp(ramp(&device), constant_flow(1.0, 0.0, &device)));
        // row 0: samples x+1, last column clamps to the border
        assert_eq!(&out[0..4], &[1.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_fractional_shift_interpolates() {
        let device = Default::default();
        let out    = values(backward_warp(ramp(&device), constant_flow(0.5, 0.5, &device)));
        // (0.5, 0.5) between 0, 1, 10, 11
        assert!((out[0] - 5.5).abs() < 1e-5);
    }

    #[test]
    fn test_upscale_flow_scales_vectors() {
        let device = Default::default();
        let flow   = constant_flow(1.0, -0.5, &device);
        let up     = upscale_flow(flow, 4);
        assert_eq!(up.dims(), [1, 2, 16, 16]);

        let v = values(up);
        assert!(v[..256].iter().all(|x| (x - 4.0).abs() < 1e-5));
        assert!(v[256..].iter().all(|x| (x + 2.0).abs() < 1e-5));
    }

    #[test]
    fn test_space_to_depth_layout() {
        let device = Default::default();
        let s2d    = values(space_to_depth(ramp(&device), 2));
        // channel 0 = even rows/cols, channel 1 = even rows/odd cols, ...
        assert_eq!(&s2d[0..4],   &[0.0, 2.0, 20.0, 22.0]);
        assert_eq!(&s2d[4..8],   &[1.0, 3.0, 21.0, 23.0]);
        assert_eq!(&s2d[8..12],  &[10.0, 12.0, 30.0, 32.0]);
        assert_eq!(&s2d[12..16], &[11.0, 13.0, 31.0, 33.0]);
    }

    #[test]
    fn test_depth_to_space_inverts() {
        let device = Default::default();
        let x      = Tensor::<TestBackend, 4>::random(
            [2, 3, 8, 12], Distribution::Uniform(0.0, 1.0), &device,
        );
        let back = depth_to_space(space_to_depth(x.clone(), 4), 4);
        assert_eq!(values(x), values(back));
    }

    #[test]
    fn test_generator_input_has_51_channels() {
        let device  = Default::default();
        let lr      = Tensor::<TestBackend, 4>::zeros([1, 3, 8, 8], &device);
        let prev_hr = Tensor::<TestBackend, 4>::zeros([1, 3, 32, 32], &device);
        let flow    = Tensor::<TestBackend, 4>::zeros([1, 2, 8, 8], &device);
        assert_eq!(generator_input(lr, prev_hr, flow, 4).dims(), [1, 51, 8, 8]);
    }
}
