// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores network weights using Burn's CompactRecorder.
//
// What gets saved:
//   1. generator_epoch_N.mpk.gz      FNet + Generator weights
//   2. discriminator_epoch_N.mpk.gz  Discriminator weights
//   3. latest_epoch.json             which epoch was last saved
//   4. train_config.json             hyperparameters, needed to
//                                    rebuild the architectures
//                                    before loading weights
//
// CompactRecorder writes half-precision MessagePack + gzip.
// Weights only load into a module built from the same config.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::CompactRecorder,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::{discriminator::Discriminator, recurrent::FrameRecurrentGenerator};

const GENERATOR:     &str = "generator";
const DISCRIMINATOR: &str = "discriminator";

/// Manages saving and loading of checkpoints in one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    // Path without extension, the recorder appends .mpk.gz
    fn model_path(&self, name: &str, epoch: usize) -> PathBuf {
        self.dir.join(format!("{name}_epoch_{epoch}"))
    }

    /// Save both networks for `epoch` and move the latest pointer.
    pub fn save_models<B: Backend>(
        &self,
        generator:     &FrameRecurrentGenerator<B>,
        discriminator: &Discriminator<B>,
        epoch:         usize,
    ) -> Result<()> {
        save_module(generator, self.model_path(GENERATOR, epoch))?;
        save_module(discriminator, self.model_path(DISCRIMINATOR, epoch))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the latest generator weights into `model`.
    pub fn load_generator<B: Backend>(
        &self,
        model:  FrameRecurrentGenerator<B>,
        device: &B::Device,
    ) -> Result<FrameRecurrentGenerator<B>> {
        let epoch = self.latest_epoch()?;
        tracing::info!("Loading generator from epoch {}", epoch);
        load_module(model, self.model_path(GENERATOR, epoch), device)
    }

    /// Load the latest discriminator weights into `model`.
    pub fn load_discriminator<B: Backend>(
        &self,
        model:  Discriminator<B>,
        device: &B::Device,
    ) -> Result<Discriminator<B>> {
        let epoch = self.latest_epoch()?;
        tracing::info!("Loading discriminator from epoch {}", epoch);
        load_module(model, self.model_path(DISCRIMINATOR, epoch), device)
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    pub fn has_config(&self) -> bool {
        self.dir.join("train_config.json").exists()
    }

    pub fn has_weights(&self) -> bool {
        self.dir.join("latest_epoch.json").exists()
    }

    /// Read latest_epoch.json; errors if nothing was saved yet.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. \
                 Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

fn save_module<B: Backend, M: Module<B>>(module: &M, path: PathBuf) -> Result<()> {
    module
        .clone()
        .save_file(path.clone(), &CompactRecorder::new())
        .map_err(|e| anyhow::anyhow!("Failed to save checkpoint to '{}': {e:?}", path.display()))
}

fn load_module<B: Backend, M: Module<B>>(module: M, path: PathBuf, device: &B::Device) -> Result<M> {
    module
        .load_file(path.clone(), &CompactRecorder::new(), device)
        .map_err(|e| {
            anyhow::anyhow!(
                "Cannot load checkpoint '{}'. Have you trained the model first? {e:?}",
                path.display()
            )
        })
}
