// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one.
//
// To the rest of the program the classifier is a black box
// (domain::traits::TabularClassifier): numeric features and
// class indices in, a fitted model out.
//
//   model.rs   — TabularNet: a sigmoid feature gate in front of
//                a two-layer MLP, a small TabNet-style stand-in
//
//   scaler.rs  — per-column standardisation fitted on train;
//                the encoder leaves NaN in place, the scaler
//                turns it into the column mean (0 after scaling)
//
//   dataset.rs — Burn Dataset of scaled rows + class index
//
//   batcher.rs — Burn Batcher: rows → batch tensors
//
//   trainer.rs — BurnTabularClassifier: Adam + cross-entropy,
//                early stopping on validation accuracy
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Arik & Pfister (2019) TabNet

/// Feature-gated MLP architecture
pub mod model;

/// Standardising feature scaler
pub mod scaler;

/// Implements Burn's Dataset trait over scaled matrix rows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Training loop and the TabularClassifier implementation
pub mod trainer;
