// ============================================================
// Layer 6 — Split Store
// ============================================================
// Writes record sets as CSV files:
//
//   data/processed/
//     train.csv
//     val.csv
//     test.csv
//     schema.json   ← column kinds of the cleaned data
//
// Each file repeats the cleaned schema's header. schema.json
// records the kinds decided on the FULL cleaned data, so a later
// run reads every split with the same types instead of guessing
// from one split's values. Cells are
// rendered through Value's Display impl, so a missing value is
// an empty cell and 1.0 is written as "1" — reading the file
// back yields the same record set.
//
// Reference: csv crate documentation
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use csv::Writer;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::record::{RecordSet, Schema};

pub const TRAIN_FILE: &str = "train.csv";
pub const VAL_FILE:   &str = "val.csv";
pub const TEST_FILE:  &str = "test.csv";
pub const SCHEMA_FILE: &str = "schema.json";

/// Writes the three split files into one directory.
pub struct SplitStore {
    dir: PathBuf,
}

impl SplitStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory (like `mkdir -p`) and write all
    /// three splits plus `schema.json`. Returns the split paths, in
    /// train/val/test order.
    pub fn save(&self, train: &RecordSet, val: &RecordSet, test: &RecordSet) -> Result<[PathBuf; 3]> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create output directory '{}'", self.dir.display()))?;

        let paths = [
            self.dir.join(TRAIN_FILE),
            self.dir.join(VAL_FILE),
            self.dir.join(TEST_FILE),
        ];
        for (path, records) in paths.iter().zip([train, val, test]) {
            write_csv(records, path)?;
        }
        save_schema(train.schema(), &self.dir.join(SCHEMA_FILE))?;
        Ok(paths)
    }
}

pub fn save_schema(schema: &Schema, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(schema)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write schema to '{}'", path.display()))
}

pub fn load_schema(path: &Path) -> Result<Schema> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read schema from '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not a valid schema", path.display()))
}

/// Write one record set with a header row and no index column.
pub fn write_csv(records: &RecordSet, path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;

    writer
        .write_record(records.schema().names())
        .with_context(|| format!("Cannot write header to '{}'", path.display()))?;

    for row in records.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .with_context(|| format!("Cannot write row to '{}'", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Cannot flush '{}'", path.display()))?;

    tracing::debug!("Wrote {} rows to '{}'", records.len(), path.display());
    Ok(())
}
