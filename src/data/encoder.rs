// ============================================================
// Layer 4 — Feature Encoder
// ============================================================
// Turns a record set into what a numeric classifier can eat:
//
//   features  every column except the target, in schema order
//               Number column → the value as f32
//               Text column   → integer category code as f32
//               Missing       → NaN (no imputation here)
//   labels    the target value rendered as text → class index
//               (a missing label renders as "" and is its own class)
//
// Codes are assigned in first-seen order:
//   ["A", "B", "A", "C"] → [0, 1, 0, 2]
//
// Consistency across splits:
//   If train and validation were each encoded on their own, "Yes"
//   could be class 0 in one and class 1 in the other. So the
//   mapping is a value (FeatureEncoding) fitted ONCE on the
//   training split and then applied unchanged to the others.
//   Categories the fit never saw map to -1; labels it never saw
//   are an error.
//
// Reference: Rust Book §8 (Hash Maps)
//            ndarray crate documentation

use std::collections::{HashMap, HashSet};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::domain::encoded::{EncodedSplit, FeatureMatrix, LabelVector};
use crate::domain::error::PipelineError;
use crate::domain::record::{ColumnKind, RecordSet, Value};

/// Code for a category the encoding was not fitted on
pub const UNSEEN_CODE: f32 = -1.0;

/// How one feature column is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureColumn {
    /// Passed through as f32
    Numeric { name: String },
    /// Category list in code order
    Categorical { name: String, categories: Vec<String> },
}

impl FeatureColumn {
    pub fn name(&self) -> &str {
        match self {
            FeatureColumn::Numeric { name } | FeatureColumn::Categorical { name, .. } => name,
        }
    }
}

/// A fitted, immutable encoding shared by every split of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoding {
    target:   String,
    features: Vec<FeatureColumn>,
    /// Label text per class index; empty when fitted without a target
    classes:  Vec<String>,
}

impl FeatureEncoding {
    /// Learn the category and label mappings from `records`.
    pub fn fit(records: &RecordSet, target: &str) -> Self {
        let schema     = records.schema();
        let target_idx = schema.index_of(target);

        let features = schema
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != target_idx)
            .map(|(i, col)| match col.kind {
                ColumnKind::Number => FeatureColumn::Numeric { name: col.name.clone() },
                ColumnKind::Text => FeatureColumn::Categorical {
                    name:       col.name.clone(),
                    categories: first_seen(records.rows().iter().filter_map(|r| r[i].as_text())),
                },
            })
            .collect();

        // A blank label renders as "" and is a class like any other
        let classes = match target_idx {
            Some(t) => first_seen(records.rows().iter().map(|r| r[t].to_string())),
            None => Vec::new(),
        };

        tracing::debug!(
            "Fitted encoding: {} features, {} classes",
            schema.len() - usize::from(target_idx.is_some()),
            classes.len()
        );

        Self { target: target.to_string(), features, classes }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn features(&self) -> &[FeatureColumn] {
        &self.features
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Encode `records` with this fitted mapping.
    ///
    /// # Errors
    /// * `SchemaMismatch` — a fitted feature column is absent
    /// * `Encoding`       — a label was never fitted
    pub fn transform(&self, records: &RecordSet) -> Result<EncodedSplit, PipelineError> {
        let schema = records.schema();

        // Resolve every fitted column to its position in this record set
        let plan: Vec<(usize, Option<HashMap<&str, f32>>)> = self
            .features
            .iter()
            .map(|feature| {
                let idx = schema.index_of(feature.name()).ok_or_else(|| {
                    PipelineError::SchemaMismatch(format!(
                        "feature column '{}' is missing",
                        feature.name()
                    ))
                })?;
                let codes = match feature {
                    FeatureColumn::Numeric { .. } => None,
                    FeatureColumn::Categorical { categories, .. } => Some(
                        categories
                            .iter()
                            .enumerate()
                            .map(|(code, c)| (c.as_str(), code as f32))
                            .collect(),
                    ),
                };
                Ok((idx, codes))
            })
            .collect::<Result<_, PipelineError>>()?;

        let n_rows = records.len();
        let n_cols = plan.len();
        let mut features: FeatureMatrix = Array2::zeros((n_rows, n_cols));
        for (r, row) in records.rows().iter().enumerate() {
            for (c, (idx, codes)) in plan.iter().enumerate() {
                features[[r, c]] = encode_cell(&row[*idx], codes.as_ref());
            }
        }

        let labels = match schema.index_of(&self.target) {
            Some(t) => Some(self.encode_labels(records, t)?),
            None => None,
        };

        Ok(EncodedSplit { features, labels })
    }

    fn encode_labels(&self, records: &RecordSet, t: usize) -> Result<LabelVector, PipelineError> {
        let index: HashMap<&str, usize> = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        records
            .rows()
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let text = row[t].to_string();
                index.get(text.as_str()).copied().ok_or_else(|| {
                    PipelineError::Encoding(format!(
                        "row {r}: label '{text}' was not seen when the encoding was fitted"
                    ))
                })
            })
            .collect()
    }
}

/// Fit and transform in one call. The mapping is local to this
/// call, so two calls on different splits may disagree on codes;
/// prefer `FeatureEncoding::fit` once and `transform` per split.
pub fn encode(
    records: &RecordSet,
    target:  &str,
) -> Result<(FeatureMatrix, Option<LabelVector>), PipelineError> {
    let encoded = FeatureEncoding::fit(records, target).transform(records)?;
    Ok((encoded.features, encoded.labels))
}

fn encode_cell(value: &Value, codes: Option<&HashMap<&str, f32>>) -> f32 {
    match (value, codes) {
        (Value::Missing, _) => f32::NAN,
        (Value::Text(s), Some(codes)) => codes.get(s.as_str()).copied().unwrap_or(UNSEEN_CODE),
        (Value::Number(x), None) => *x as f32,
        // Kind disagrees with the fit: a number in a categorical column
        // is looked up by its text, text in a numeric column is unusable.
        (Value::Number(x), Some(codes)) => {
            codes.get(x.to_string().as_str()).copied().unwrap_or(UNSEEN_CODE)
        }
        (Value::Text(_), None) => f32::NAN,
    }
}

/// Distinct values in first-seen order.
fn first_seen<S, I>(values: I) -> Vec<String>
where
    S: AsRef<str>,
    I: IntoIterator<Item = S>,
{
    let mut seen = HashSet::new();
    let mut out  = Vec::new();
    for v in values {
        let v = v.as_ref();
        if seen.insert(v.to_string()) {
            out.push(v.to_string());
        }
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{Column, Schema};

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn records(rows: Vec<Vec<Value>>) -> RecordSet {
        let schema = Schema::new(vec![
            Column::new("Contract", ColumnKind::Text),
            Column::new("tenure", ColumnKind::Number),
            Column::new("Churn", ColumnKind::Text),
        ]);
        RecordSet::new(schema, rows).unwrap()
    }

    fn train_set() -> RecordSet {
        records(vec![
            vec![text("A"), Value::Number(1.0), text("No")],
            vec![text("B"), Value::Number(2.0), text("Yes")],
            vec![text("A"), Value::Number(3.0), text("No")],
            vec![text("C"), Value::Missing, text("Yes")],
        ])
    }

    #[test]
    fn test_first_seen_category_codes() {
        let (x, y) = encode(&train_set(), "Churn").unwrap();
        assert_eq!(x.column(0).to_vec(), vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(y.unwrap(), vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_target_is_dropped_from_features() {
        let (x, _) = encode(&train_set(), "Churn").unwrap();
        assert_eq!(x.dim(), (4, 2));
    }

    #[test]
    fn test_missing_numeric_is_nan() {
        let (x, _) = encode(&train_set(), "Churn").unwrap();
        assert_eq!(x[[0, 1]], 1.0);
        assert!(x[[3, 1]].is_nan());
    }

    #[test]
    fn test_missing_category_is_nan() {
        let set = records(vec![
            vec![text("A"), Value::Number(1.0), text("No")],
            vec![Value::Missing, Value::Number(2.0), text("Yes")],
        ]);
        let (x, _) = encode(&set, "Churn").unwrap();
        assert!(x[[1, 0]].is_nan());
    }

    #[test]
    fn test_fitted_encoding_is_reused_across_splits() {
        let encoding = FeatureEncoding::fit(&train_set(), "Churn");
        // validation sees "Yes" first and category "C" first
        let val = records(vec![
            vec![text("C"), Value::Number(5.0), text("Yes")],
            vec![text("A"), Value::Number(6.0), text("No")],
        ]);
        let encoded = encoding.transform(&val).unwrap();
        assert_eq!(encoded.features.column(0).to_vec(), vec![2.0, 0.0]);
        assert_eq!(encoded.labels.unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_unseen_category_gets_sentinel() {
        let encoding = FeatureEncoding::fit(&train_set(), "Churn");
        let val = records(vec![vec![text("Z"), Value::Number(1.0), text("No")]]);
        let encoded = encoding.transform(&val).unwrap();
        assert_eq!(encoded.features[[0, 0]], UNSEEN_CODE);
    }

    #[test]
    fn test_unseen_label_is_error() {
        let encoding = FeatureEncoding::fit(&train_set(), "Churn");
        let val = records(vec![vec![text("A"), Value::Number(1.0), text("Maybe")]]);
        let err = encoding.transform(&val).unwrap_err();
        assert!(matches!(err, PipelineError::Encoding(_)));
    }

    #[test]
    fn test_missing_label_is_its_own_class() {
        let set = records(vec![
            vec![text("A"), Value::Number(1.0), text("No")],
            vec![text("B"), Value::Number(2.0), Value::Missing],
            vec![text("A"), Value::Number(3.0), Value::Missing],
        ]);
        let (_, y) = encode(&set, "Churn").unwrap();
        assert_eq!(y.unwrap(), vec![0, 1, 1]);

        let encoding = FeatureEncoding::fit(&set, "Churn");
        assert_eq!(encoding.classes(), &["No".to_string(), String::new()]);
    }

    #[test]
    fn test_missing_label_unseen_by_fit_is_error() {
        let encoding = FeatureEncoding::fit(&train_set(), "Churn");
        let val = records(vec![vec![text("A"), Value::Number(1.0), Value::Missing]]);
        let err = encoding.transform(&val).unwrap_err();
        assert!(matches!(err, PipelineError::Encoding(_)));
    }

    #[test]
    fn test_absent_target_yields_no_labels() {
        let encoding = FeatureEncoding::fit(&train_set(), "Churn");
        let schema = Schema::new(vec![
            Column::new("Contract", ColumnKind::Text),
            Column::new("tenure", ColumnKind::Number),
        ]);
        let unlabelled = RecordSet::new(schema, vec![vec![text("B"), Value::Number(9.0)]]).unwrap();
        let encoded = encoding.transform(&unlabelled).unwrap();
        assert!(encoded.labels.is_none());
        assert_eq!(encoded.features.row(0).to_vec(), vec![1.0, 9.0]);
    }

    #[test]
    fn test_missing_feature_column_is_schema_mismatch() {
        let encoding = FeatureEncoding::fit(&train_set(), "Churn");
        let schema = Schema::new(vec![Column::new("Churn", ColumnKind::Text)]);
        let set = RecordSet::new(schema, vec![vec![text("No")]]).unwrap();
        let err = encoding.transform(&set).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }

    #[test]
    fn test_numeric_labels_render_as_text() {
        let schema = Schema::new(vec![
            Column::new("x", ColumnKind::Number),
            Column::new("Churn", ColumnKind::Number),
        ]);
        let set = RecordSet::new(
            schema,
            vec![
                vec![Value::Number(0.5), Value::Number(1.0)],
                vec![Value::Number(0.7), Value::Number(0.0)],
            ],
        )
        .unwrap();
        let encoding = FeatureEncoding::fit(&set, "Churn");
        assert_eq!(encoding.classes(), &["1".to_string(), "0".to_string()]);
    }

    #[test]
    fn test_encoding_round_trips_through_json() {
        let encoding = FeatureEncoding::fit(&train_set(), "Churn");
        let json = serde_json::to_string(&encoding).unwrap();
        let back: FeatureEncoding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, encoding);
    }
}
