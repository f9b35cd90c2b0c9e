// ============================================================
// Layer 5 — Losses
// ============================================================
// Adversarial terms work on sigmoid probabilities, so they are
// clamped before the log:
//
//   D:  −mean(log D(real)) − mean(log(1 − D(fake)))
//   G:  −mean(log D(fake))
//
// Feature matching compares discriminator feature maps of real
// and generated inputs; the real side is detached so it acts as
// a fixed target.

use burn::{
    nn::loss::{MseLoss, Reduction},
    prelude::*,
};

const PROB_EPS: f64 = 1e-12;

fn log_clamped<B: Backend>(p: Tensor<B, 2>) -> Tensor<B, 2> {
    p.clamp(PROB_EPS, 1.0).log()
}

pub fn discriminator_loss<B: Backend>(real: Tensor<B, 2>, fake: Tensor<B, 2>) -> Tensor<B, 1> {
    let real_term = log_clamped(real).mean().neg();
    let fake_term = log_clamped(fake.neg().add_scalar(1.0)).mean().neg();
    real_term + fake_term
}

pub fn generator_adversarial_loss<B: Backend>(fake: Tensor<B, 2>) -> Tensor<B, 1> {
    log_clamped(fake).mean().neg()
}

pub fn content_loss<B: Backend>(pred: Tensor<B, 4>, target: Tensor<B, 4>) -> Tensor<B, 1> {
    MseLoss::new().forward(pred, target, Reduction::Mean)
}

/// Mean over layers of MSE(fake_i, detach(real_i)).
///
/// # Panics
/// If the slices are empty or differ in length.
pub fn feature_matching_loss<B: Backend>(
    real: &[Tensor<B, 4>],
    fake: &[Tensor<B, 4>],
) -> Tensor<B, 1> {
    assert_eq!(real.len(), fake.len(), "feature lists differ in depth");
    assert!(!real.is_empty(), "no feature maps to match");

    let layer_loss = |r: &Tensor<B, 4>, f: &Tensor<B, 4>| content_loss(f.clone(), r.clone().detach());

    let mut total = layer_loss(&real[0], &fake[0]);
    for (r, f) in real.iter().zip(fake.iter()).skip(1) {
        total = total + layer_loss(r, f);
    }
    total / real.len() as f64
}

/// Peak signal-to-noise ratio (dB) for images in [0, 1].
pub fn psnr(mse: f64) -> f64 {
    if mse <= 0.0 {
        f64::INFINITY
    } else {
        -10.0 * mse.log10()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::{ElementConversion, TensorData};

    type TestBackend = NdArray;

    fn probs(values: Vec<f32>) -> Tensor<TestBackend, 2> {
        let n = values.len();
        Tensor::from_data(TensorData::new(values, [n, 1]), &Default::default())
    }

    fn scalar(t: Tensor<TestBackend, 1>) -> f64 {
        t.into_scalar().elem::<f64>()
    }

    #[test]
    fn test_discriminator_loss_values() {
        // perfect discriminator → 0
        assert!(scalar(discriminator_loss(probs(vec![1.0, 1.0]), probs(vec![0.0, 0.0]))).abs() < 1e-6);
        // undecided discriminator → 2·ln 2
        let l = scalar(discriminator_loss(probs(vec![0.5]), probs(vec![0.5])));
        assert!((l - 2.0 * std::f64::consts::LN_2).abs() < 1e-5);
    }

    #[test]
    fn test_adversarial_loss_is_finite_at_zero() {
        let l = scalar(generator_adversarial_loss(probs(vec![0.0])));
        assert!(l.is_finite());
        assert!(l > 20.0);
    }

    #[test]
    fn test_feature_matching_identical_is_zero() {
        let device = Default::default();
        let feats  = vec![
            Tensor::<TestBackend, 4>::ones([1, 2, 4, 4], &device),
            Tensor::<TestBackend, 4>::zeros([1, 3, 2, 2], &device),
        ];
        assert!(scalar(feature_matching_loss(&feats, &feats)).abs() < 1e-9);
    }

    #[test]
    fn test_feature_matching_averages_layers() {
        let device = Default::default();
        let real   = vec![
            Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device),
            Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device),
        ];
        let fake   = vec![
            Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device) * 2.0,
            Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device),
        ];
        // (4 + 0) / 2
        assert!((scalar(feature_matching_loss(&real, &fake)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_psnr() {
        assert!((psnr(0.01) - 20.0).abs() < 1e-9);
        assert!(psnr(0.0).is_infinite());
    }
}
