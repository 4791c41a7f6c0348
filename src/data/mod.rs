// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a raw CSV file and the numeric matrices
// the classifier consumes.
//
//   raw CSV
//       │
//       ▼
//   CsvLoader         → header + typed cells (schema inferred or declared)
//       │
//       ▼
//   Cleaner           → trim text, coerce numeric columns, drop duplicates
//       │
//       ▼
//   split()           → stratified train / validation / test
//       │
//       ▼
//   FeatureEncoding   → fitted on train, applied to every split
//
// Each module is responsible for exactly one step.
//
// Reference: Rust Book §13 (Iterators and Closures)

use std::path::PathBuf;

use crate::domain::error::PipelineError;
use crate::domain::record::RecordSet;
use crate::domain::traits::RecordSource;

/// Reads delimited text files into a RecordSet using the csv crate
pub mod loader;

/// Trims, coerces and de-duplicates a RecordSet
pub mod preprocessor;

/// Seeded, stratified three-way split
pub mod splitter;

/// Category and label codes → f32 matrix + class indices
pub mod encoder;

/// Load a CSV with an inferred schema and clean it.
pub fn load_and_clean(path: impl Into<PathBuf>) -> Result<RecordSet, PipelineError> {
    let raw = loader::CsvLoader::new(path).load()?;
    Ok(preprocessor::Cleaner::new().clean(&raw))
}
