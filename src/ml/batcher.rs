// ============================================================
// Layer 5 — Tabular Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks TabularRow samples
// into tensors for one forward pass.
//
// How batching works here:
//   Input:  Vec<TabularRow>, each with F scaled features
//   Output: features [N, F] (f32) and targets [N] (int)
//
//   We copy every row into one flat Vec, then reshape:
//   [r1_f1, r1_f2, ..., r1_fF, r2_f1, ..., rN_fF] → [N, F]
//
// Generic over the Backend so the same batcher feeds the
// autodiff backend during training and the plain backend
// during validation and prediction.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*, tensor::TensorData};

use crate::ml::dataset::TabularRow;

// ─── TabularBatch ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TabularBatch<B: Backend> {
    /// Scaled features — shape: [batch_size, n_features]
    pub features: Tensor<B, 2>,

    /// Class indices — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── TabularBatcher ───────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct TabularBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
}

impl<B: Backend> TabularBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TabularRow, TabularBatch<B>> for TabularBatcher<B> {
    fn batch(&self, items: Vec<TabularRow>) -> TabularBatch<B> {
        let n          = items.len();
        let n_features = items.first().map_or(0, |r| r.features.len());

        let targets: Vec<i64> = items.iter().map(|r| r.label as i64).collect();
        let flat:    Vec<f32> = items.into_iter().flat_map(|r| r.features).collect();

        TabularBatch {
            features: Tensor::<B, 2>::from_data(TensorData::new(flat, [n, n_features]), &self.device),
            targets:  Tensor::<B, 1, Int>::from_data(TensorData::new(targets, [n]), &self.device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn row(features: &[f32], label: usize) -> TabularRow {
        TabularRow { features: features.to_vec(), label }
    }

    #[test]
    fn test_stacks_rows_in_order() {
        let batcher = TabularBatcher::<NdArray>::new(Default::default());
        let batch   = batcher.batch(vec![row(&[5.0, 6.0], 0), row(&[1.0, 2.0], 1)]);

        assert_eq!(batch.features.dims(), [2, 2]);
        assert_eq!(batch.targets.dims(), [2]);

        let flat = batch.features.into_data().to_vec::<f32>().unwrap();
        assert_eq!(flat, vec![5.0, 6.0, 1.0, 2.0]);
        let targets = batch.targets.into_data().to_vec::<i64>().unwrap();
        assert_eq!(targets, vec![0, 1]);
    }
}
