// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration
//   Step 2: Generate high-res clips       (Layer 4 - data)
//   Step 3: Build LR/HR samples           (Layer 4 - data)
//   Step 4: Split train/validation        (Layer 4 - data)
//   Step 5: Save config                   (Layer 6 - infra)
//   Step 6: Run the adversarial loop      (Layer 5 - ml)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{ClipDataset, ClipSample},
    splitter::split_train_val,
    synthetic::SyntheticClipSource,
};
use crate::domain::traits::ClipSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    discriminator::DiscriminatorConfig,
    fnet::FNetConfig,
    generator::UPSCALE,
    recurrent::{FrameRecurrentConfig, CLIP_FRAMES},
    trainer::{run_training, LossWeights},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every hyperparameter of a run. Saved next to the checkpoints so
// `summary` can rebuild exactly the same networks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub checkpoint_dir: String,
    pub num_clips:      usize,
    pub lr_size:        usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub num_resblock:   usize,
    pub max_flow:       f64,
    pub adv_weight:     f64,
    pub warp_weight:    f64,
    pub fm_weight:      f64,
    pub train_fraction: f64,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            num_clips:      64,
            lr_size:        32,
            batch_size:     4,
            epochs:         10,
            lr:             5e-5,
            num_resblock:   10,
            max_flow:       24.0,
            adv_weight:     1e-3,
            warp_weight:    1.0,
            fm_weight:      0.2,
            train_fraction: 0.8,
            seed:           42,
        }
    }
}

impl TrainConfig {
    /// High-res crop size the discriminator sees
    pub fn hr_size(&self) -> usize {
        self.lr_size * UPSCALE
    }

    pub fn model_config(&self) -> FrameRecurrentConfig {
        FrameRecurrentConfig::new(self.num_resblock).with_max_flow(self.max_flow)
    }

    pub fn discriminator_config(&self) -> DiscriminatorConfig {
        DiscriminatorConfig::new().with_crop_size(self.hr_size())
    }

    pub fn loss_weights(&self) -> LossWeights {
        LossWeights {
            adversarial:       self.adv_weight,
            warp:              self.warp_weight,
            feature_matching:  self.fm_weight,
        }
    }

    /// Clips that land in the training split, rounded as the splitter does
    pub fn train_clip_count(&self) -> usize {
        (self.num_clips as f64 * self.train_fraction.clamp(0.0, 1.0)).round() as usize
    }

    /// Reject settings the networks cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.lr_size > 0 && self.lr_size % FNetConfig::SPATIAL_MULTIPLE == 0,
            "lr_size must be a positive multiple of {} (flow network depth), got {}",
            FNetConfig::SPATIAL_MULTIPLE,
            self.lr_size,
        );
        ensure!(
            self.hr_size() % DiscriminatorConfig::DOWNSCALE == 0,
            "high-res size {} must be a multiple of {}",
            self.hr_size(),
            DiscriminatorConfig::DOWNSCALE,
        );
        ensure!(self.batch_size > 0, "batch_size must be positive");
        ensure!(self.epochs > 0, "epochs must be positive");
        ensure!(self.num_clips > 0, "num_clips must be positive");
        ensure!(
            self.train_fraction > 0.0 && self.train_fraction <= 1.0,
            "train_fraction must be in (0, 1], got {}",
            self.train_fraction,
        );
        ensure!(
            self.train_clip_count() >= 1,
            "{} clips with train_fraction {} leaves no training clips",
            self.num_clips,
            self.train_fraction,
        );
        ensure!(self.lr > 0.0, "learning rate must be positive");
        ensure!(self.max_flow > 0.0, "max_flow must be positive");
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Generate clips ────────────────────────────────────────────
        tracing::info!(
            "Generating {} synthetic clips at {}x{}",
            cfg.num_clips, cfg.hr_size(), cfg.hr_size()
        );
        let source = SyntheticClipSource::new(cfg.num_clips, CLIP_FRAMES, cfg.hr_size(), cfg.seed);
        let clips  = source.load_all()?;

        // ── Step 3: LR/HR samples ─────────────────────────────────────────────
        let samples = clips
            .iter()
            .map(|clip| ClipSample::from_clip(clip, UPSCALE))
            .collect::<Result<Vec<_>>>()?;

        // ── Step 4: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.train_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        let train_dataset = ClipDataset::new(train_samples);
        let val_dataset   = ClipDataset::new(val_samples);

        // ── Step 5: Save config ───────────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 6: Adversarial training (Layer 5) ────────────────────────────
        run_training(cfg, train_dataset, val_dataset, ckpt_manager, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = TrainConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.hr_size(), 128);
        assert_eq!(cfg.discriminator_config().dense_features(), 48);
    }

    #[test]
    fn test_rejects_lr_size_not_multiple_of_16() {
        let cfg = TrainConfig { lr_size: 24, ..TrainConfig::default() };
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("multiple of 16"));
    }

    #[test]
    fn test_rejects_bad_fraction_and_zero_sizes() {
        assert!(TrainConfig { train_fraction: 0.0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { train_fraction: 1.5, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { batch_size: 0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { epochs: 0, ..TrainConfig::default() }.validate().is_err());
    }

    #[test]
    fn test_rejects_split_without_training_clips() {
        let cfg = TrainConfig { num_clips: 1, train_fraction: 0.4, ..TrainConfig::default() };
        assert_eq!(cfg.train_clip_count(), 0);
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("no training clips"));

        // the same fraction is fine once it rounds to at least one clip
        let cfg = TrainConfig { num_clips: 3, train_fraction: 0.4, ..TrainConfig::default() };
        assert_eq!(cfg.train_clip_count(), 1);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_train_clip_count_matches_splitter() {
        let cfg = TrainConfig { num_clips: 7, train_fraction: 0.8, ..TrainConfig::default() };
        let (train, _) = split_train_val((0..cfg.num_clips).collect::<Vec<_>>(), cfg.train_fraction, cfg.seed);
        assert_eq!(train.len(), cfg.train_clip_count());
    }

    #[test]
    fn test_config_json_round_trip_keeps_model_shape() {
        let cfg  = TrainConfig { num_resblock: 3, lr_size: 16, ..TrainConfig::default() };
        let back: TrainConfig = serde_json::from_str(&serde_json::to_string(&cfg).unwrap()).unwrap();
        assert_eq!(back.model_config().num_resblock, 3);
        assert_eq!(back.hr_size(), 64);
    }
}
