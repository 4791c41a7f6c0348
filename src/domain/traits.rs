// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits rather
// than concrete types:
//   - CsvLoader implements RecordSource
//   - BurnTabularClassifier implements TabularClassifier
//
// Swapping the classifier (a gradient-boosted model, a remote
// service) means implementing one trait; the use cases do not
// change.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::encoded::{EncodedSplit, FeatureMatrix, FitSummary};
use crate::domain::error::PipelineError;
use crate::domain::record::RecordSet;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Anything that can produce a record set.
pub trait RecordSource {
    fn load(&self) -> Result<RecordSet, PipelineError>;
}

// ─── TabularClassifier ────────────────────────────────────────────────────────
/// A black-box classifier over numeric feature matrices.
///
/// Implementations:
///   - BurnTabularClassifier → attentive MLP on the burn NdArray backend
pub trait TabularClassifier {
    /// Train on `train`, using `val` for early stopping.
    /// Both splits must carry labels.
    fn fit(&mut self, train: &EncodedSplit, val: &EncodedSplit) -> Result<FitSummary>;

    /// Predict one class index per row. Errors if called before `fit`.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>>;
}
