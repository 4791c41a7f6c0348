// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `prepare-data` and `train-model`,
// and all their configurable flags.
//
// clap's derive macros generate the --help text, the errors for
// missing args and the string → number conversions.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{prepare_use_case::PrepareConfig, train_use_case::TrainConfig};
use crate::ml::trainer::ClassifierConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean a raw churn CSV and write stratified train/val/test splits
    PrepareData(PrepareArgs),

    /// Encode the prepared splits and train the classifier
    TrainModel(TrainArgs),
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Raw CSV file
    #[arg(long)]
    pub input: PathBuf,

    /// Directory that receives train.csv, val.csv and test.csv
    #[arg(long, default_value = "data/processed")]
    pub outdir: PathBuf,

    /// Column to stratify on
    #[arg(long, default_value = "Churn")]
    pub target: String,

    /// Share of all rows held out for testing
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Share of all rows held out for validation
    #[arg(long, default_value_t = 0.1)]
    pub val_fraction: f64,

    /// Seed for the shuffles; same seed + same input → same files
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        PrepareConfig {
            input:         a.input,
            outdir:        a.outdir,
            target:        a.target,
            test_fraction: a.test_fraction,
            val_fraction:  a.val_fraction,
            seed:          a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Training split written by prepare-data
    #[arg(long)]
    pub train: PathBuf,

    /// Validation split; must have the same columns as --train
    #[arg(long)]
    pub val: PathBuf,

    /// Held-out split to score once training finishes
    #[arg(long)]
    pub test: Option<PathBuf>,

    /// Label column
    #[arg(long, default_value = "Churn")]
    pub target: String,

    /// Upper bound on passes over the training split
    #[arg(long, default_value_t = 10)]
    pub max_epochs: usize,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    #[arg(long, default_value_t = 1024)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 2e-2)]
    pub lr: f64,

    /// Width of the hidden layers
    #[arg(long, default_value_t = 64)]
    pub hidden: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Column kinds for every split; defaults to the schema.json
    /// written by prepare-data next to --train, if present
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Reuse this saved encoding instead of fitting one on --train
    #[arg(long)]
    pub encoding: Option<PathBuf>,

    /// Write the encoding used for this run as JSON
    #[arg(long)]
    pub encoding_out: Option<PathBuf>,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train:        a.train,
            val:          a.val,
            test:         a.test,
            target:       a.target,
            schema:       a.schema,
            encoding:     a.encoding,
            encoding_out: a.encoding_out,
            classifier:   ClassifierConfig {
                max_epochs: a.max_epochs,
                patience:   a.patience,
                batch_size: a.batch_size,
                lr:         a.lr,
                hidden:     a.hidden,
                seed:       a.seed,
                ..ClassifierConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_prepare_defaults() {
        let cli = Cli::try_parse_from(["churn-tabnet", "prepare-data", "--input", "raw.csv"]).unwrap();
        let Commands::PrepareData(args) = cli.command else { panic!("wrong subcommand") };
        let cfg: PrepareConfig = args.into();
        assert_eq!(cfg.outdir, PathBuf::from("data/processed"));
        assert_eq!(cfg.target, "Churn");
        assert_eq!((cfg.test_fraction, cfg.val_fraction, cfg.seed), (0.2, 0.1, 42));
    }

    #[test]
    fn test_train_flags_reach_classifier_config() {
        let cli = Cli::try_parse_from([
            "churn-tabnet", "train-model",
            "--train", "t.csv", "--val", "v.csv",
            "--max-epochs", "5", "--lr", "0.001", "--encoding-out", "enc.json",
        ])
        .unwrap();
        let Commands::TrainModel(args) = cli.command else { panic!("wrong subcommand") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.classifier.max_epochs, 5);
        assert_eq!(cfg.classifier.lr, 0.001);
        assert_eq!(cfg.classifier.batch_size, 1024);
        assert_eq!(cfg.encoding_out, Some(PathBuf::from("enc.json")));
        assert_eq!(cfg.test, None);
        assert_eq!(cfg.schema, None);
    }

    #[test]
    fn test_prepare_requires_input() {
        assert!(Cli::try_parse_from(["churn-tabnet", "prepare-data"]).is_err());
    }
}
