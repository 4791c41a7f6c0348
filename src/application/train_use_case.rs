// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Resolve the schema and load train    (Layer 4 / 6)
//   Step 2: Load val CSV against the same schema (Layer 4 - data)
//   Step 3: Fit (or reload) the feature encoding (Layer 4 / 6)
//   Step 4: Encode both splits with it           (Layer 4 - data)
//   Step 5: Fit the classifier                   (Layer 5 - ml)
//   Step 6: Optionally score a held-out test CSV (Layer 5 - ml)
//
// Schema, in order of preference: --schema, the schema.json
// prepare-data wrote next to train.csv, inference on train.
//
// Train and val must be encoded by the SAME fitted encoding,
// otherwise their category codes and class indices disagree.
//
// Reference: Rust Book §10 (Traits as parameters)
//            Burn Book §5 (Training)

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{encoder::FeatureEncoding, loader::CsvLoader};
use crate::domain::encoded::{EncodedSplit, FitSummary};
use crate::domain::record::{RecordSet, Schema};
use crate::domain::traits::{RecordSource, TabularClassifier};
use crate::infra::encoding_store::{load_encoding, save_encoding};
use crate::infra::split_store::{load_schema, SCHEMA_FILE};
use crate::ml::trainer::{BurnTabularClassifier, ClassifierConfig};

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train:        PathBuf,
    pub val:          PathBuf,
    /// Held-out split scored after training
    pub test:         Option<PathBuf>,
    pub target:       String,
    /// Column kinds to load every split with
    pub schema:       Option<PathBuf>,
    /// Reuse a saved encoding instead of fitting one on train
    pub encoding:     Option<PathBuf>,
    pub encoding_out: Option<PathBuf>,
    pub classifier:   ClassifierConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train:        PathBuf::from("data/processed/train.csv"),
            val:          PathBuf::from("data/processed/val.csv"),
            test:         None,
            target:       "Churn".to_string(),
            schema:       None,
            encoding:     None,
            encoding_out: None,
            classifier:   ClassifierConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainReport {
    pub summary:       FitSummary,
    pub classes:       Vec<String>,
    pub test_accuracy: Option<f64>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainReport> {
        let mut classifier = BurnTabularClassifier::new(self.config.classifier.clone());
        self.execute_with(&mut classifier)
    }

    /// Runs the pipeline against any classifier.
    pub fn execute_with<C: TabularClassifier>(&self, classifier: &mut C) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Steps 1-2: Load ───────────────────────────────────────────────────
        let mut loader = CsvLoader::new(&cfg.train);
        if let Some(schema) = self.resolve_schema()? {
            loader = loader.with_schema(schema);
        }
        let train = loader
            .load()
            .with_context(|| format!("Cannot load training split '{}'", cfg.train.display()))?;
        ensure!(
            train.schema().contains(&cfg.target),
            "target column '{}' is not in '{}'",
            cfg.target,
            cfg.train.display()
        );
        let val = load_like(&cfg.val, train.schema())?;
        tracing::info!("Loaded {} train rows and {} validation rows", train.len(), val.len());

        // ── Step 3: Encoding ──────────────────────────────────────────────────
        let encoding = match &cfg.encoding {
            Some(path) => {
                let encoding = load_encoding(path)?;
                ensure!(
                    encoding.target() == cfg.target,
                    "encoding '{}' was fitted for target '{}', not '{}'",
                    path.display(),
                    encoding.target(),
                    cfg.target
                );
                encoding
            }
            None => FeatureEncoding::fit(&train, &cfg.target),
        };
        if let Some(path) = &cfg.encoding_out {
            save_encoding(&encoding, path)?;
        }

        // ── Step 4: Encode ────────────────────────────────────────────────────
        let train_enc = encoding.transform(&train).context("Cannot encode training split")?;
        let val_enc   = encoding.transform(&val).context("Cannot encode validation split")?;
        tracing::info!(
            "Encoded {} features; classes: {:?}",
            train_enc.n_features(),
            encoding.classes()
        );

        // ── Step 5: Fit ───────────────────────────────────────────────────────
        let summary = classifier.fit(&train_enc, &val_enc)?;

        // ── Step 6: Score test ────────────────────────────────────────────────
        let test_accuracy = match &cfg.test {
            Some(path) => {
                let test     = load_like(path, train.schema())?;
                let test_enc = encoding.transform(&test).context("Cannot encode test split")?;
                let accuracy = score(&*classifier, &test_enc)?;
                tracing::info!("Test accuracy: {:.4}", accuracy);
                Some(accuracy)
            }
            None => None,
        };

        Ok(TrainReport {
            summary,
            classes: encoding.classes().to_vec(),
            test_accuracy,
        })
    }

    fn resolve_schema(&self) -> Result<Option<Schema>> {
        let cfg = &self.config;
        if let Some(path) = &cfg.schema {
            return load_schema(path).map(Some);
        }
        let beside_train = cfg.train.with_file_name(SCHEMA_FILE);
        if beside_train.is_file() {
            tracing::info!("Using column kinds from '{}'", beside_train.display());
            return load_schema(&beside_train).map(Some);
        }
        tracing::debug!("No schema file, inferring column kinds from '{}'", cfg.train.display());
        Ok(None)
    }
}

fn load_like(path: &Path, schema: &Schema) -> Result<RecordSet> {
    CsvLoader::new(path)
        .with_schema(schema.clone())
        .load()
        .with_context(|| format!("Cannot load '{}'", path.display()))
}

fn score<C: TabularClassifier>(classifier: &C, split: &EncodedSplit) -> Result<f64> {
    let labels = split.labels.as_deref().context("test split has no labels")?;
    let preds  = classifier.predict(&split.features)?;
    if labels.is_empty() {
        return Ok(0.0);
    }
    let hits = preds.iter().zip(labels).filter(|(p, l)| p == l).count();
    Ok(hits as f64 / labels.len() as f64)
}
