// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train FNet, generator and discriminator adversarially
    Train(TrainArgs),

    /// Print parameter counts and tensor shapes of the networks
    Summary(SummaryArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory for checkpoints, config and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of synthetic three-frame clips to generate
    #[arg(long, default_value_t = 64)]
    pub num_clips: usize,

    /// Low-res frame size; must be a multiple of 16.
    /// High-res frames are 4x larger.
    #[arg(long, default_value_t = 32)]
    pub lr_size: usize,

    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate, shared by both networks
    #[arg(long, default_value_t = 5e-5)]
    pub lr: f64,

    /// Residual blocks in the generator body
    #[arg(long, default_value_t = 10)]
    pub num_resblock: usize,

    /// Largest flow magnitude in low-res pixels
    #[arg(long, default_value_t = 24.0)]
    pub max_flow: f64,

    #[arg(long, default_value_t = 1e-3)]
    pub adv_weight: f64,

    #[arg(long, default_value_t = 1.0)]
    pub warp_weight: f64,

    /// Weight of discriminator feature matching
    #[arg(long, default_value_t = 0.2)]
    pub fm_weight: f64,

    /// Fraction of clips used for training, the rest validates
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seed for clip generation, the split and loader shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Boundary between Layer 1 and Layer 2 — the application
/// layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            checkpoint_dir: a.checkpoint_dir,
            num_clips:      a.num_clips,
            lr_size:        a.lr_size,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            num_resblock:   a.num_resblock,
            max_flow:       a.max_flow,
            adv_weight:     a.adv_weight,
            warp_weight:    a.warp_weight,
            fm_weight:      a.fm_weight,
            train_fraction: a.train_fraction,
            seed:           a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Read config (and weights, if any) from this directory
    #[arg(long)]
    pub checkpoint_dir: Option<String>,

    /// Generator depth when no saved config is found
    #[arg(long, default_value_t = 10)]
    pub num_resblock: usize,
}
