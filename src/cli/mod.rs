// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `prepare-data` — clean a raw CSV and write train/val/test
//   2. `train-model`  — encode the splits and fit the classifier
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PrepareArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "churn-tabnet",
    version = "0.1.0",
    about = "Prepare the Telco churn dataset and train a tabular classifier on it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case. Nothing is computed here.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::PrepareData(args) => run_prepare(args),
            Commands::TrainModel(args)  => run_train(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    let outdir = args.outdir.clone();
    PrepareUseCase::new(args.into()).execute()?;

    println!("Saved splits to {}", outdir.display());
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training on '{}' (validation '{}')", args.train.display(), args.val.display());

    let report = TrainUseCase::new(args.into()).execute()?;
    tracing::info!(
        "Best validation accuracy {:.4} at epoch {} of {}",
        report.summary.best_val_accuracy,
        report.summary.best_epoch,
        report.summary.epochs_run
    );
    if let Some(acc) = report.test_accuracy {
        println!("Test accuracy: {:.1}%", acc * 100.0);
    }

    println!("Training complete.");
    Ok(())
}
