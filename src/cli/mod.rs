// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to the use cases.
//
//   1. `train`   — trains a classifier with early stopping
//   2. `predict` — classifies sequences with the best checkpoint

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "varlen-rnn-classifier",
    version,
    about = "Train an RNN classifier on variable-length protein sequences, then predict."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on sequences in: {}", args.input_file);

    let use_case = TrainUseCase::new(args.into());
    let report   = use_case.execute()?;

    if report.stopped_early {
        tracing::info!("Stopped early after {} epochs", report.epochs_run);
    }
    match report.best_epoch {
        Some(epoch) => println!(
            "Training complete after {} epochs. Best test accuracy {:.4} at epoch {} (checkpoint saved).",
            report.epochs_run, report.best_accuracy, epoch
        ),
        None => println!(
            "Training complete after {} epochs. Test accuracy never rose above 0; no checkpoint saved.",
            report.epochs_run
        ),
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(&args.checkpoint_dir, args.delimiter)?;
    let report   = use_case.execute(&args.input_file)?;

    for (residues, p) in &report.predictions {
        println!("{}\t{}\t{:.4}", residues, p.label, p.confidence);
    }
    if let Some(acc) = report.accuracy {
        println!("\nAccuracy: {:.4} ({} sequences)", acc, report.predictions.len());
    }
    Ok(())
}
