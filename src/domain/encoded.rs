// ============================================================
// Layer 3 — Encoded Splits
// ============================================================
// What the feature encoder produces and the classifier eats:
// a fixed-width f32 matrix (one row per record) and, when the
// target column is present, one class index per row.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Row per record, column per feature, in schema order minus the target.
/// Missing values are `NaN`; unseen categories are `-1`.
pub type FeatureMatrix = Array2<f32>;

/// Integer class index per record.
pub type LabelVector = Vec<usize>;

#[derive(Debug, Clone)]
pub struct EncodedSplit {
    pub features: FeatureMatrix,
    /// `None` when the split carries no target column (inference only).
    pub labels: Option<LabelVector>,
}

impl EncodedSplit {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Outcome of a classifier fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub epochs_run:        usize,
    pub best_epoch:        usize,
    pub best_val_accuracy: f64,
}
