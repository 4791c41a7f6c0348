// ============================================================
// Layer 5 — Feature Scaler
// ============================================================
// z-score per column: (x - mean) / std, with mean and std taken
// from the TRAINING matrix only and reused for validation and
// prediction.
//
// NaN cells are skipped when fitting and become 0.0 (the column
// mean) when transforming, so the network never sees NaN.
// Constant columns get std = 1 to avoid dividing by zero.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    means: Vec<f32>,
    stds:  Vec<f32>,
}

impl FeatureScaler {
    pub fn fit(features: &Array2<f32>) -> Self {
        let (means, stds) = features
            .axis_iter(Axis(1))
            .map(|col| {
                let finite: Vec<f64> = col
                    .iter()
                    .filter(|x| x.is_finite())
                    .map(|&x| f64::from(x))
                    .collect();
                if finite.is_empty() {
                    return (0.0, 1.0);
                }
                let n    = finite.len() as f64;
                let mean = finite.iter().sum::<f64>() / n;
                let var  = finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                let std  = var.sqrt();
                (mean as f32, if std > 1e-12 { std as f32 } else { 1.0 })
            })
            .unzip();
        Self { means, stds }
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, features: &Array2<f32>) -> Array2<f32> {
        let mut out = features.clone();
        for (mut col, (mean, std)) in out
            .axis_iter_mut(Axis(1))
            .zip(self.means.iter().zip(&self.stds))
        {
            col.mapv_inplace(|x| if x.is_finite() { (x - mean) / std } else { 0.0 });
        }
        out
    }
}
