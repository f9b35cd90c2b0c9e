// ============================================================
// Layer 5 — Adversarial Training Loop
// ============================================================
// One step on a batch of LR/HR frame triplets:
//
//   1. G forward     recurrent generator over the LR triplet
//   2. D update      real triplet vs detached fake triplet
//   3. G update      content + w_warp·warp + w_adv·adv + w_fm·fm
//
//   content  MSE(output_t, hr_t) averaged over frames
//   warp     MSE(warp(lr_{t-1}, flow_t), lr_t) averaged over t ≥ 1
//   adv      −log D(fake), with D already updated this step
//   fm       feature matching on D's pyramid outputs
//
// Why detach the fake triplet for the D update?
//   The discriminator step must only move D. Without the detach,
//   backward() would also push gradients into the generator, and
//   the generator optimiser would then see them mixed with its own.
//
// Why a warp loss?
//   Nothing else tells FNet what a good flow is. Comparing lr_t
//   with lr_{t-1} warped by the flow gives it a direct target.
//
// Training runs on Autodiff<Wgpu>; validation uses model.valid()
// on the inner backend, so no graph is recorded there.
//
// Reference: Burn Book §5, Goodfellow et al. (2014) GANs

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::{ClipBatch, ClipBatcher}, dataset::ClipDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    discriminator::Discriminator,
    losses::{
        content_loss, discriminator_loss, feature_matching_loss,
        generator_adversarial_loss, psnr,
    },
    recurrent::{discriminator_input, FrameRecurrentGenerator, CLIP_FRAMES},
    warp::backward_warp,
};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Weights of the auxiliary generator loss terms (content has weight 1)
#[derive(Debug, Clone, Copy)]
pub struct LossWeights {
    pub adversarial:      f64,
    pub warp:             f64,
    pub feature_matching: f64,
}

/// Scalar losses of one step, or their per-epoch average
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepLosses {
    pub d_loss:       f64,
    pub g_loss:       f64,
    pub content_loss: f64,
    pub warp_loss:    f64,
}

impl StepLosses {
    fn add(&mut self, other: &StepLosses) {
        self.d_loss       += other.d_loss;
        self.g_loss       += other.g_loss;
        self.content_loss += other.content_loss;
        self.warp_loss    += other.warp_loss;
    }

    fn averaged(self, steps: usize) -> StepLosses {
        if steps == 0 {
            return StepLosses {
                d_loss: f64::NAN, g_loss: f64::NAN, content_loss: f64::NAN, warp_loss: f64::NAN,
            };
        }
        let n = steps as f64;
        StepLosses {
            d_loss:       self.d_loss / n,
            g_loss:       self.g_loss / n,
            content_loss: self.content_loss / n,
            warp_loss:    self.warp_loss / n,
        }
    }
}

fn scalar<B: Backend>(t: &Tensor<B, 1>) -> f64 {
    t.clone().into_scalar().elem::<f64>()
}

/// Mean content MSE of the recurrent outputs against the HR frames.
fn clip_content_loss<B: Backend>(outputs: &[Tensor<B, 4>], targets: &[Tensor<B, 4>]) -> Tensor<B, 1> {
    let frames = outputs.len() as f64;
    let mut total = content_loss(outputs[0].clone(), targets[0].clone());
    for (o, t) in outputs.iter().zip(targets.iter()).skip(1) {
        total = total + content_loss(o.clone(), t.clone());
    }
    total / frames
}

/// Mean MSE between each LR frame and its predecessor warped by the estimated flow.
fn clip_warp_loss<B: Backend>(lr_frames: &[Tensor<B, 4>], flows: &[Tensor<B, 4>]) -> Tensor<B, 1> {
    let pairs = flows.len() as f64;
    let pair_loss = |t: usize| {
        let warped = backward_warp(lr_frames[t - 1].clone(), flows[t - 1].clone());
        content_loss(warped, lr_frames[t].clone())
    };

    let mut total = pair_loss(1);
    for t in 2..lr_frames.len() {
        total = total + pair_loss(t);
    }
    total / pairs
}

/// Run one discriminator update followed by one generator update.
pub fn train_step<B, OG, OD>(
    generator:     FrameRecurrentGenerator<B>,
    discriminator: Discriminator<B>,
    gen_optim:     &mut OG,
    disc_optim:    &mut OD,
    batch:         &ClipBatch<B>,
    weights:       LossWeights,
    lr:            f64,
) -> (FrameRecurrentGenerator<B>, Discriminator<B>, StepLosses)
where
    B:  AutodiffBackend,
    OG: Optimizer<FrameRecurrentGenerator<B>, B>,
    OD: Optimizer<Discriminator<B>, B>,
{
    let lr_frames = batch.lr_frames();
    let hr_frames = batch.hr_frames();
    assert_eq!(lr_frames.len(), CLIP_FRAMES, "training clips must be frame triplets");

    // ── Generator forward ─────────────────────────────────────────────────────
    let output  = generator.forward_clip(&lr_frames);
    let content = clip_content_loss(&output.frames, &hr_frames);
    let warp    = clip_warp_loss(&lr_frames, &output.flows);

    // frame 0 → 1 comes from the recurrence, frame 2 → 1 needs its own pass
    let flow_prev = output.flows[0].clone();
    let flow_next = generator.estimate_flow(lr_frames[1].clone(), lr_frames[2].clone());

    let real_in = discriminator_input(&hr_frames, &lr_frames, flow_prev.clone(), flow_next.clone());
    let fake_in = discriminator_input(&output.frames, &lr_frames, flow_prev, flow_next);

    // ── Discriminator update ──────────────────────────────────────────────────
    let d_real = discriminator.forward(real_in.clone());
    let d_fake = discriminator.forward(fake_in.clone().detach());
    let d_loss = discriminator_loss(d_real.probability, d_fake.probability);
    let d_loss_val = scalar(&d_loss);

    let grads = GradientsParams::from_grads(d_loss.backward(), &discriminator);
    let discriminator = disc_optim.step(lr, discriminator, grads);

    // ── Generator update ──────────────────────────────────────────────────────
    let d_fake = discriminator.forward(fake_in);
    let d_real = discriminator.forward(real_in);
    let adv    = generator_adversarial_loss(d_fake.probability);
    let fm     = feature_matching_loss(&d_real.features, &d_fake.features);

    let content_val = scalar(&content);
    let warp_val    = scalar(&warp);
    let g_loss = content
        + warp * weights.warp
        + adv * weights.adversarial
        + fm * weights.feature_matching;
    let g_loss_val = scalar(&g_loss);

    let grads = GradientsParams::from_grads(g_loss.backward(), &generator);
    let generator = gen_optim.step(lr, generator, grads);

    let losses = StepLosses {
        d_loss:       d_loss_val,
        g_loss:       g_loss_val,
        content_loss: content_val,
        warp_loss:    warp_val,
    };
    (generator, discriminator, losses)
}

/// Mean content MSE over all validation batches, None if there are none.
pub fn evaluate<B: Backend>(
    generator: &FrameRecurrentGenerator<B>,
    batches:   impl Iterator<Item = ClipBatch<B>>,
) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for batch in batches {
        let output = generator.forward_clip(&batch.lr_frames());
        total += scalar(&clip_content_loss(&output.frames, &batch.hr_frames()));
        count += 1;
    }
    (count > 0).then(|| total / count as f64)
}

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: ClipDataset,
    val_dataset:   ClipDataset,
    ckpt_manager:  CheckpointManager,
    metrics:       MetricsLogger,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<MyBackend>(cfg, train_dataset, val_dataset, &ckpt_manager, &metrics, device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ClipDataset,
    val_dataset:   ClipDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<()> {
    // ── Build models ──────────────────────────────────────────────────────────
    let mut generator: FrameRecurrentGenerator<B> = cfg.model_config().init(&device);
    let mut discriminator: Discriminator<B>       = cfg.discriminator_config().init(&device);
    tracing::info!(
        "Models ready: generator {} params, discriminator {} params",
        generator.num_params(),
        discriminator.num_params(),
    );

    let optim_cfg      = AdamConfig::new().with_epsilon(1e-8);
    let mut gen_optim  = optim_cfg.init::<B, FrameRecurrentGenerator<B>>();
    let mut disc_optim = optim_cfg.init::<B, Discriminator<B>>();
    let weights        = cfg.loss_weights();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ClipBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(ClipBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut best_psnr = f64::NEG_INFINITY;

    for epoch in 1..=cfg.epochs {
        let mut sums  = StepLosses::default();
        let mut steps = 0usize;

        for batch in train_loader.iter() {
            let (g, d, losses) = train_step(
                generator,
                discriminator,
                &mut gen_optim,
                &mut disc_optim,
                &batch,
                weights,
                cfg.lr,
            );
            generator     = g;
            discriminator = d;
            sums.add(&losses);
            steps += 1;

            tracing::debug!(
                "epoch {} step {}: d_loss={:.4} g_loss={:.4}",
                epoch, steps, losses.d_loss, losses.g_loss
            );
        }
        let avg = sums.averaged(steps);

        // ── Validation ────────────────────────────────────────────────────────
        let val_mse = evaluate(&generator.valid(), val_loader.iter()).unwrap_or(f64::NAN);

        let m = EpochMetrics {
            epoch,
            d_loss:       avg.d_loss,
            g_loss:       avg.g_loss,
            content_loss: avg.content_loss,
            warp_loss:    avg.warp_loss,
            val_mse,
            val_psnr:     psnr(val_mse),
        };

        println!(
            "Epoch {:>3}/{} | d_loss={:.4} | g_loss={:.4} | content={:.5} | warp={:.5} | val_psnr={:.2} dB",
            epoch, cfg.epochs, m.d_loss, m.g_loss, m.content_loss, m.warp_loss, m.val_psnr,
        );

        metrics.log(&m)?;
        if m.is_improvement(best_psnr) {
            best_psnr = m.val_psnr;
            tracing::info!("New best validation PSNR: {:.2} dB", best_psnr);
        }

        ckpt_manager.save_models(&generator, &discriminator, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete!");
    Ok(())
}
