// ============================================================
// Layer 2 — Summary Use Case
// ============================================================
// Rebuilds the three networks and reports, for each one, its
// parameter count and the shapes of one forward pass on zeros.
//
// If the checkpoint directory holds a saved config, that config
// decides the architecture; if it also holds weights, they are
// loaded first so a bad checkpoint shows up here.
//
// Runs on the NdArray (CPU) backend; nothing is trained.

use anyhow::Result;
use burn::{backend::NdArray, prelude::*};

use crate::application::train_use_case::TrainConfig;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::generator::UPSCALE;

type SummaryBackend = NdArray;

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    pub name:   &'static str,
    pub params: usize,
    pub input:  Vec<usize>,
    pub output: Vec<usize>,
}

pub struct SummaryUseCase {
    checkpoint_dir: Option<String>,
    num_resblock:   usize,
}

impl SummaryUseCase {
    pub fn new(checkpoint_dir: Option<String>, num_resblock: usize) -> Self {
        Self { checkpoint_dir, num_resblock }
    }

    fn resolve_config(&self) -> Result<(TrainConfig, Option<CheckpointManager>)> {
        if let Some(dir) = &self.checkpoint_dir {
            let ckpt = CheckpointManager::new(dir)?;
            if ckpt.has_config() {
                tracing::info!("Using saved config from '{}'", dir);
                return Ok((ckpt.load_config()?, Some(ckpt)));
            }
            tracing::info!("No saved config in '{}', using defaults", dir);
        }
        let cfg = TrainConfig { num_resblock: self.num_resblock, ..TrainConfig::default() };
        Ok((cfg, None))
    }

    pub fn execute(&self) -> Result<Vec<NetworkSummary>> {
        let (cfg, ckpt) = self.resolve_config()?;
        cfg.validate()?;

        let device = Default::default();
        let mut generator     = cfg.model_config().init::<SummaryBackend>(&device);
        let mut discriminator = cfg.discriminator_config().init::<SummaryBackend>(&device);

        if let Some(ckpt) = ckpt.filter(|c| c.has_weights()) {
            generator     = ckpt.load_generator(generator, &device)?;
            discriminator = ckpt.load_discriminator(discriminator, &device)?;
        }

        let lr = cfg.lr_size;
        let hr = cfg.hr_size();
        let c  = cfg.model_config().image_channels;

        let fnet_in  = [1, 2 * c, lr, lr];
        let gen_in   = [1, c + UPSCALE * UPSCALE * c, lr, lr];
        let disc_in  = [1, cfg.discriminator_config().in_channels, hr, hr];

        let flow = generator.fnet.forward(Tensor::zeros(fnet_in, &device));
        let sr   = generator.generator.forward(Tensor::zeros(gen_in, &device));
        let disc = discriminator.forward(Tensor::zeros(disc_in, &device));

        let summaries = vec![
            NetworkSummary {
                name:   "fnet",
                params: generator.fnet.num_params(),
                input:  fnet_in.to_vec(),
                output: flow.dims().to_vec(),
            },
            NetworkSummary {
                name:   "generator",
                params: generator.generator.num_params(),
                input:  gen_in.to_vec(),
                output: sr.dims().to_vec(),
            },
            NetworkSummary {
                name:   "discriminator",
                params: discriminator.num_params(),
                input:  disc_in.to_vec(),
                output: disc.probability.dims().to_vec(),
            },
        ];

        tracing::debug!("Discriminator emits {} feature maps", disc.features.len());
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_follows_saved_config() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path()).unwrap();
        ckpt.save_config(&TrainConfig { lr_size: 16, num_resblock: 1, ..TrainConfig::default() })
            .unwrap();

        let use_case = SummaryUseCase::new(Some(tmp.path().display().to_string()), 7);
        let rows     = use_case.execute().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].output, vec![1, 2, 16, 16]);
        assert_eq!(rows[1].input,  vec![1, 51, 16, 16]);
        assert_eq!(rows[1].output, vec![1, 3, 64, 64]);
        assert_eq!(rows[2].input,  vec![1, 27, 64, 64]);
        assert_eq!(rows[2].output, vec![1, 1]);
        assert!(rows.iter().all(|r| r.params > 0));
    }

    #[test]
    fn test_invalid_saved_config_is_rejected() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path()).unwrap();
        ckpt.save_config(&TrainConfig { lr_size: 20, ..TrainConfig::default() }).unwrap();

        let use_case = SummaryUseCase::new(Some(tmp.path().display().to_string()), 1);
        assert!(use_case.execute().is_err());
    }
}
