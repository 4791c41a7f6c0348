// ============================================================
// Layer 5 — Training Loop
// ============================================================
// BurnTabularClassifier: the default TabularClassifier.
//
// Per epoch:
//   1. Train DataLoader yields shuffled mini-batches (seeded)
//   2. Forward, cross-entropy, backward, Adam step
//   3. model.valid() → validation loss and accuracy
//   4. Keep the weights of the best validation accuracy; stop
//      after `patience` epochs without improvement
//
// Backends:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on InferBackend (NdArray)
//   - argmax(1) returns [batch,1] so we flatten before .equal()
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{anyhow, ensure, Context, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::domain::encoded::{EncodedSplit, FeatureMatrix, FitSummary};
use crate::domain::traits::TabularClassifier;
use crate::ml::batcher::{TabularBatch, TabularBatcher};
use crate::ml::dataset::TabularDataset;
use crate::ml::model::{TabularNet, TabularNetConfig};
use crate::ml::scaler::FeatureScaler;

type TrainBackend = Autodiff<NdArray>;
type InferBackend = NdArray;

// ─── Classifier Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub max_epochs: usize,
    pub patience:   usize,
    pub batch_size: usize,
    pub lr:         f64,
    pub hidden:     usize,
    pub dropout:    f64,
    pub seed:       u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_epochs: 10,
            patience:   3,
            batch_size: 1024,
            lr:         2e-2,
            hidden:     64,
            dropout:    0.1,
            seed:       42,
        }
    }
}

struct Fitted {
    model:  TabularNet<InferBackend>,
    scaler: FeatureScaler,
}

pub struct BurnTabularClassifier {
    config: ClassifierConfig,
    device: NdArrayDevice,
    fitted: Option<Fitted>,
}

impl BurnTabularClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config, device: NdArrayDevice::default(), fitted: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

impl TabularClassifier for BurnTabularClassifier {
    fn fit(&mut self, train: &EncodedSplit, val: &EncodedSplit) -> Result<FitSummary> {
        let cfg = self.config.clone();
        let train_labels = train.labels.as_deref().context("training split has no labels")?;
        let val_labels   = val.labels.as_deref().context("validation split has no labels")?;

        ensure!(train.n_rows() > 0, "training split is empty");
        ensure!(cfg.batch_size > 0, "batch size must be positive");
        ensure!(
            train_labels.len() == train.n_rows() && val_labels.len() == val.n_rows(),
            "every row needs exactly one label"
        );
        ensure!(
            train.n_features() == val.n_features(),
            "train has {} features but validation has {}",
            train.n_features(),
            val.n_features()
        );

        // Binary head even if only one class made it into the data
        let n_classes = train_labels
            .iter()
            .chain(val_labels)
            .max()
            .map_or(2, |&m| (m + 1).max(2));

        let scaler  = FeatureScaler::fit(&train.features);
        let x_train = scaler.transform(&train.features);
        let x_val   = scaler.transform(&val.features);

        // ── Build model ───────────────────────────────────────────────────────
        TrainBackend::seed(cfg.seed);
        let mut model: TabularNet<TrainBackend> = TabularNetConfig::new(train.n_features(), n_classes)
            .with_hidden(cfg.hidden)
            .with_dropout(cfg.dropout)
            .init(&self.device);
        tracing::info!(
            "Model ready: {} features → {} hidden → {} classes",
            train.n_features(),
            cfg.hidden,
            n_classes
        );

        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

        // ── Training data loader (TrainBackend, reshuffled every epoch) ───────
        let train_loader = DataLoaderBuilder::new(TabularBatcher::<TrainBackend>::new(self.device.clone()))
            .batch_size(cfg.batch_size)
            .shuffle(cfg.seed)
            .num_workers(1)
            .build(TabularDataset::labelled(&x_train, train_labels));

        // ── Validation data loader (InferBackend, no autodiff overhead) ───────
        let val_loader = DataLoaderBuilder::new(TabularBatcher::<InferBackend>::new(self.device.clone()))
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(TabularDataset::labelled(&x_val, val_labels));

        let mut best: Option<(usize, f64, TabularNet<InferBackend>)> = None;
        let mut stale      = 0usize;
        let mut epochs_run = 0usize;

        // ── Epoch loop ────────────────────────────────────────────────────────
        for epoch in 1..=cfg.max_epochs {
            epochs_run = epoch;

            let mut loss_sum = 0.0f64;
            let mut batches  = 0usize;
            for batch in train_loader.iter() {
                let (loss, _) = model.forward_loss(batch.features, batch.targets);

                loss_sum += loss.clone().into_scalar().elem::<f64>();
                batches  += 1;

                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(cfg.lr, model, grads);
            }
            let train_loss = loss_sum / batches.max(1) as f64;

            // dropout disabled for evaluation
            let model_valid = model.valid();
            let (val_loss, val_acc) = evaluate(&model_valid, val_loader.as_ref(), &self.device);

            println!(
                "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
                epoch,
                cfg.max_epochs,
                train_loss,
                val_loss,
                val_acc * 100.0,
            );

            let improved = best.as_ref().map_or(true, |(_, acc, _)| val_acc > *acc);
            if improved {
                best  = Some((epoch, val_acc, model_valid));
                stale = 0;
            } else {
                stale += 1;
                if stale >= cfg.patience {
                    tracing::info!("No improvement for {} epochs, stopping at epoch {}", stale, epoch);
                    break;
                }
            }
        }

        let (best_epoch, best_val_accuracy, best_model) =
            best.context("max_epochs is 0, nothing was trained")?;
        tracing::info!("Best epoch {} (val_acc={:.4})", best_epoch, best_val_accuracy);

        self.fitted = Some(Fitted { model: best_model, scaler });
        Ok(FitSummary { epochs_run, best_epoch, best_val_accuracy })
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        let fitted = self.fitted.as_ref().context("classifier has not been fitted")?;
        ensure!(
            features.ncols() == fitted.scaler.n_features(),
            "expected {} features, got {}",
            fitted.scaler.n_features(),
            features.ncols()
        );

        // No shuffle and no workers: batches come back in row order
        let x      = fitted.scaler.transform(features);
        let loader = DataLoaderBuilder::new(TabularBatcher::<InferBackend>::new(self.device.clone()))
            .batch_size(self.config.batch_size.max(1))
            .build(TabularDataset::unlabelled(&x));

        let mut predictions = Vec::with_capacity(x.nrows());
        for batch in loader.iter() {
            let logits = fitted.model.forward(batch.features);
            let picked = logits
                .argmax(1)
                .flatten::<1>(0, 1)
                .into_data()
                .to_vec::<i64>()
                .map_err(|e| anyhow!("cannot read predictions: {e:?}"))?;
            predictions.extend(picked.into_iter().map(|p| p as usize));
        }
        Ok(predictions)
    }
}

/// Mean batch loss and accuracy over a validation loader.
fn evaluate(
    model:  &TabularNet<InferBackend>,
    loader: &dyn DataLoader<TabularBatch<InferBackend>>,
    device: &NdArrayDevice,
) -> (f64, f64) {
    let ce = CrossEntropyLossConfig::new().init(device);

    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    let mut correct  = 0usize;
    let mut seen     = 0usize;
    for batch in loader.iter() {
        seen += batch.targets.dims()[0];
        let logits = model.forward(batch.features);

        loss_sum += ce
            .forward(logits.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();
        batches += 1;

        let hits: i64 = logits
            .argmax(1)
            .flatten::<1>(0, 1)
            .equal(batch.targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();
        correct += hits as usize;
    }

    let loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
    let acc  = if seen == 0 { 0.0 } else { correct as f64 / seen as f64 };
    (loss, acc)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Label is 1 exactly when the first feature is positive.
    fn separable(n: usize) -> EncodedSplit {
        let features = Array2::from_shape_fn((n, 2), |(r, c)| {
            let sign = if r % 2 == 0 { 1.0 } else { -1.0 };
            if c == 0 { sign * (1.0 + (r % 7) as f32) } else { (r % 3) as f32 }
        });
        let labels = (0..n).map(|r| usize::from(r % 2 == 0)).collect();
        EncodedSplit { features, labels: Some(labels) }
    }

    fn small_config() -> ClassifierConfig {
        ClassifierConfig { max_epochs: 40, patience: 40, batch_size: 32, lr: 1e-2, hidden: 16, ..Default::default() }
    }

    #[test]
    fn test_learns_separable_data() {
        let mut clf = BurnTabularClassifier::new(small_config());
        let summary = clf.fit(&separable(200), &separable(60)).unwrap();
        assert!(summary.best_val_accuracy > 0.9, "accuracy {}", summary.best_val_accuracy);

        let preds = clf.predict(&separable(10).features).unwrap();
        assert_eq!(preds.len(), 10);
    }

    #[test]
    fn test_predictions_follow_row_order() {
        let cfg = ClassifierConfig { batch_size: 3, ..small_config() };
        let mut clf = BurnTabularClassifier::new(cfg);
        clf.fit(&separable(200), &separable(60)).unwrap();

        // batches of 3 over 11 rows, last batch partial
        let rows   = separable(11);
        let preds  = clf.predict(&rows.features).unwrap();
        let labels = rows.labels.unwrap();
        let hits   = preds.iter().zip(&labels).filter(|(p, l)| p == l).count();
        assert_eq!(preds.len(), 11);
        assert!(hits >= 10, "{hits}/11 correct");
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let clf = BurnTabularClassifier::new(ClassifierConfig::default());
        assert!(!clf.is_fitted());
        assert!(clf.predict(&separable(4).features).is_err());
    }

    #[test]
    fn test_fit_requires_labels() {
        let mut clf = BurnTabularClassifier::new(small_config());
        let mut unlabelled = separable(10);
        unlabelled.labels = None;
        assert!(clf.fit(&unlabelled, &separable(10)).is_err());
    }

    #[test]
    fn test_early_stopping_bounds_epochs() {
        let cfg = ClassifierConfig { max_epochs: 50, patience: 1, batch_size: 16, ..Default::default() };
        let mut clf = BurnTabularClassifier::new(cfg);
        let summary = clf.fit(&separable(64), &separable(16)).unwrap();
        assert!(summary.epochs_run <= 50);
        assert!(summary.best_epoch <= summary.epochs_run);
    }
}
