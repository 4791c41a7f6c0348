// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Orchestrates data preparation in order:
//
//   Step 1: Load the raw CSV          (Layer 4 - data)
//   Step 2: Clean it                  (Layer 4 - data)
//   Step 3: Stratified 3-way split    (Layer 4 - data)
//   Step 4: Write train/val/test CSVs (Layer 6 - infra)
//           and the cleaned schema.json
//
// Any failure stops the run; nothing is retried.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    load_and_clean,
    splitter::{self, SplitOptions},
};
use crate::infra::split_store::SplitStore;

// ─── Preparation Configuration ───────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    pub input:         PathBuf,
    pub outdir:        PathBuf,
    pub target:        String,
    pub test_fraction: f64,
    pub val_fraction:  f64,
    pub seed:          u64,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            input:         PathBuf::from("data/raw/WA_Fn-UseC_-Telco-Customer-Churn.csv"),
            outdir:        PathBuf::from("data/processed"),
            target:        "Churn".to_string(),
            test_fraction: splitter::DEFAULT_TEST_FRACTION,
            val_fraction:  splitter::DEFAULT_VAL_FRACTION,
            seed:          splitter::DEFAULT_SEED,
        }
    }
}

/// Row counts of the written splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareReport {
    pub cleaned: usize,
    pub train:   usize,
    pub val:     usize,
    pub test:    usize,
}

pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PrepareReport> {
        let cfg = &self.config;

        // ── Steps 1-2: Load and clean ─────────────────────────────────────────
        tracing::info!("Loading raw data from '{}'", cfg.input.display());
        let records = load_and_clean(&cfg.input)
            .with_context(|| format!("Cannot prepare '{}'", cfg.input.display()))?;
        tracing::info!("{} rows after cleaning", records.len());

        // ── Step 3: Split ─────────────────────────────────────────────────────
        let options = SplitOptions {
            test_fraction: cfg.test_fraction,
            val_fraction:  cfg.val_fraction,
            seed:          cfg.seed,
        };
        let (train, val, test) = splitter::split(&records, &cfg.target, &options)
            .context("Cannot split the cleaned data")?;
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            train.len(),
            val.len(),
            test.len()
        );

        // ── Step 4: Write ─────────────────────────────────────────────────────
        SplitStore::new(&cfg.outdir).save(&train, &val, &test)?;

        Ok(PrepareReport {
            cleaned: records.len(),
            train:   train.len(),
            val:     val.len(),
            test:    test.len(),
        })
    }
}
