// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on the way OUT:
//
//   split_store.rs    — writes train.csv / val.csv / test.csv
//                       into the output directory, creating it
//                       first. Same header as the cleaned input,
//                       no index column, blanks for missing cells.
//                       Also saves/loads schema.json, the
//                       cleaned column kinds.
//
//   encoding_store.rs — saves/loads the fitted FeatureEncoding
//                       as JSON so a later run can encode new
//                       data with exactly the same codes.
//
// Writes are not atomic: if the second file fails, the first
// stays on disk. Rerunning overwrites all three deterministically.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            csv / serde_json crate documentation

/// Train/validation/test CSV writer
pub mod split_store;

/// Fitted encoding persistence (JSON)
pub mod encoding_store;
