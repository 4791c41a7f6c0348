// ============================================================
// Layer 6 — Encoding Store
// ============================================================
// Saves the fitted FeatureEncoding as pretty JSON so the exact
// category and label codes used for training can be applied to
// data that arrives later.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::data::encoder::FeatureEncoding;

pub fn save_encoding(encoding: &FeatureEncoding, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(encoding)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write encoding to '{}'", path.display()))?;

    tracing::info!("Saved feature encoding to '{}'", path.display());
    Ok(())
}

pub fn load_encoding(path: &Path) -> Result<FeatureEncoding> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read encoding from '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not a valid feature encoding", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{Column, ColumnKind, RecordSet, Schema, Value};
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        let schema = Schema::new(vec![
            Column::new("Contract", ColumnKind::Text),
            Column::new("Churn", ColumnKind::Text),
        ]);
        let set = RecordSet::new(
            schema,
            vec![
                vec![Value::Text("Month-to-month".into()), Value::Text("Yes".into())],
                vec![Value::Text("Two year".into()), Value::Text("No".into())],
            ],
        )
        .unwrap();
        let encoding = FeatureEncoding::fit(&set, "Churn");

        let dir  = tempdir().unwrap();
        let path = dir.path().join("models").join("encoding.json");
        save_encoding(&encoding, &path).unwrap();

        assert_eq!(load_encoding(&path).unwrap(), encoding);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(load_encoding(&dir.path().join("absent.json")).is_err());
    }
}
