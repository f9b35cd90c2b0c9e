// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per epoch to {checkpoint_dir}/metrics.csv:
//
//   epoch,d_loss,g_loss,content_loss,warp_loss,val_mse,val_psnr
//   1,1.386200,0.051300,0.041100,0.003200,0.039800,14.001200
//
// How to read it:
//   - content_loss / val_mse should fall, val_psnr should rise
//   - d_loss near 2·ln2 ≈ 1.386 means D cannot tell real from fake
//   - d_loss → 0 means D has won and G gets little signal

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,d_loss,g_loss,content_loss,warp_loss,val_mse,val_psnr";

/// Averages for one training epoch plus validation quality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:        usize,
    pub d_loss:       f64,
    pub g_loss:       f64,
    pub content_loss: f64,
    pub warp_loss:    f64,
    pub val_mse:      f64,
    /// dB, higher is better
    pub val_psnr:     f64,
}

impl EpochMetrics {
    /// True if this epoch beats the best validation PSNR so far
    pub fn is_improvement(&self, best_psnr: f64) -> bool {
        self.val_psnr > best_psnr
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            self.epoch,
            self.d_loss,
            self.g_loss,
            self.content_loss,
            self.warp_loss,
            self.val_mse,
            self.val_psnr,
        )
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the header if the file does not exist yet, so
    /// repeated runs append to the same log.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics dir '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: g_loss={:.4}, val_psnr={:.2}",
            m.epoch,
            m.g_loss,
            m.val_psnr,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
