// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   `train`   — adversarial training on synthetic clips
//   `summary` — parameter counts and tensor shapes

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SummaryArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "vsr-gan",
    version,
    about = "Frame-recurrent video super-resolution GAN: flow network, generator, discriminator."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Summary(args) => run_summary(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training, checkpoints in: {}", args.checkpoint_dir);

    let use_case = TrainUseCase::new(args.into());
    use_case.execute()?;

    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    use crate::application::summary_use_case::SummaryUseCase;

    let use_case = SummaryUseCase::new(args.checkpoint_dir, args.num_resblock);
    let rows     = use_case.execute()?;

    println!("{:<14} {:>12}  {:<20} {:<20}", "network", "params", "input", "output");
    for row in rows {
        println!(
            "{:<14} {:>12}  {:<20} {:<20}",
            row.name,
            row.params,
            format!("{:?}", row.input),
            format!("{:?}", row.output),
        );
    }
    Ok(())
}
