// ============================================================
// Layer 4 — Record Cleaner
// ============================================================
// Light cleaning applied once after loading the raw file.
//
// Why do we need to clean at all?
//   The Telco export pads some text cells with spaces and
//   stores TotalCharges as text, because brand-new customers
//   have a single blank " " instead of a number. Left alone,
//   the whole column would be treated as categorical.
//
// Cleaning steps (applied in order):
//   1. Trim leading/trailing whitespace from every text value
//   2. Coerce the configured numeric-as-text columns to numbers;
//      anything that does not parse becomes Missing (not an error)
//   3. Drop rows that exactly repeat an earlier row, keeping the
//      first occurrence and the order of the survivors
//
// The cleaner never mutates its input and is idempotent:
//   clean(clean(x)) == clean(x)
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use std::collections::HashSet;

use crate::domain::record::{ColumnKind, RecordSet, Value};

/// Column known to hold numbers stored as text in the raw export
pub const TOTAL_CHARGES: &str = "TotalCharges";

pub struct Cleaner {
    /// Columns to coerce to numbers when present
    numeric_text_columns: Vec<String>,
}

impl Cleaner {
    /// Cleaner for the Telco export (coerces `TotalCharges`)
    pub fn new() -> Self {
        Self::with_numeric_columns([TOTAL_CHARGES])
    }

    pub fn with_numeric_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            numeric_text_columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Return a cleaned copy of `records`.
    pub fn clean(&self, records: &RecordSet) -> RecordSet {
        let mut schema = records.schema().clone();
        let mut rows: Vec<Vec<Value>> = records.rows().to_vec();

        // ── Step 1: Trim text values ──────────────────────────────────────────
        for row in rows.iter_mut() {
            for value in row.iter_mut() {
                if let Value::Text(s) = value {
                    let trimmed = s.trim();
                    if trimmed.len() != s.len() {
                        *s = trimmed.to_string();
                    }
                }
            }
        }

        // ── Step 2: Coerce numeric-as-text columns ────────────────────────────
        for name in &self.numeric_text_columns {
            if let Some(idx) = schema.index_of(name) {
                let missing = coerce_column(&mut rows, idx);
                schema = schema.with_kind(idx, ColumnKind::Number);
                tracing::debug!("Coerced '{}' to numbers ({} values missing)", name, missing);
            }
        }

        // ── Step 3: Drop exact duplicates ─────────────────────────────────────
        let before = rows.len();
        let rows   = dedup_rows(rows);
        if rows.len() < before {
            tracing::info!("Dropped {} duplicate rows", before - rows.len());
        }

        RecordSet::from_trusted(schema, rows)
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Coerce every value in column `idx` to a number in place.
/// Returns how many values ended up missing.
fn coerce_column(rows: &mut [Vec<Value>], idx: usize) -> usize {
    let mut missing = 0;
    for row in rows.iter_mut() {
        let coerced = match &row[idx] {
            Value::Number(x) => Value::Number(*x),
            Value::Text(s) => s.trim().parse::<f64>().map(Value::number).unwrap_or(Value::Missing),
            Value::Missing => Value::Missing,
        };
        if coerced.is_missing() {
            missing += 1;
        }
        row[idx] = coerced;
    }
    missing
}

/// Keep the first occurrence of each distinct row, in order.
fn dedup_rows(rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{Column, Schema};

    fn telco(rows: Vec<Vec<Value>>) -> RecordSet {
        let schema = Schema::new(vec![
            Column::new("gender", ColumnKind::Text),
            Column::new("TotalCharges", ColumnKind::Text),
            Column::new("Churn", ColumnKind::Text),
        ]);
        RecordSet::new(schema, rows).unwrap()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_trims_text_values() {
        let set     = telco(vec![vec![text("  Male "), text("10"), text("No\t")]]);
        let cleaned = Cleaner::new().clean(&set);
        assert_eq!(cleaned.rows()[0][0], text("Male"));
        assert_eq!(cleaned.rows()[0][2], text("No"));
    }

    #[test]
    fn test_coerces_total_charges() {
        let set = telco(vec![
            vec![text("Male"), text("29.85"), text("No")],
            vec![text("Male"), text(" "), text("Yes")],
        ]);
        let cleaned = Cleaner::new().clean(&set);
        assert_eq!(cleaned.schema().columns()[1].kind, ColumnKind::Number);
        assert_eq!(cleaned.rows()[0][1], Value::Number(29.85));
        assert!(cleaned.rows()[1][1].is_missing());
        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn test_blank_numeric_rows_marked_missing_not_dropped() {
        // 100 rows, 5 with a blank TotalCharges
        let rows: Vec<Vec<Value>> = (0..100)
            .map(|i| {
                let charge = if i % 20 == 0 { String::new() } else { format!("{}.5", i) };
                vec![text(&format!("c{i}")), text(&charge), text("No")]
            })
            .collect();
        let cleaned = Cleaner::new().clean(&telco(rows));

        assert_eq!(cleaned.len(), 100);
        let charges = cleaned.column("TotalCharges").unwrap();
        assert_eq!(charges.iter().filter(|v| v.is_missing()).count(), 5);
        assert_eq!(charges.iter().filter(|v| v.as_number().is_some()).count(), 95);
        assert_eq!(charges[1], &Value::Number(1.5));
    }

    #[test]
    fn test_drops_exact_duplicates_keeping_first() {
        let a = vec![text("Male"), text("1"), text("No")];
        let b = vec![text("Female"), text("2"), text("Yes")];
        let set = telco(vec![a.clone(), b.clone(), a.clone(), a.clone(), b.clone()]);
        let cleaned = Cleaner::new().clean(&set);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.rows()[0][0], text("Male"));
        assert_eq!(cleaned.rows()[1][0], text("Female"));
    }

    #[test]
    fn test_rows_equal_after_trimming_are_duplicates() {
        let set = telco(vec![
            vec![text("Male"), text("1"), text("No")],
            vec![text(" Male"), text("1 "), text("No")],
        ]);
        assert_eq!(Cleaner::new().clean(&set).len(), 1);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let set = telco(vec![
            vec![text(" Male"), text(" "), text("No")],
            vec![text("Male "), text(""), text("No")],
            vec![text("Female"), text("12.5"), text("Yes")],
            vec![text("Female"), text("12.5"), text("Yes")],
        ]);
        let cleaner = Cleaner::new();
        let once    = cleaner.clean(&set);
        let twice   = cleaner.clean(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let set  = telco(vec![vec![text(" Male "), text(" "), text("No")]]);
        let copy = set.clone();
        let _    = Cleaner::new().clean(&set);
        assert_eq!(set, copy);
    }

    #[test]
    fn test_absent_numeric_column_is_ignored() {
        let schema = Schema::new(vec![Column::new("gender", ColumnKind::Text)]);
        let set    = RecordSet::new(schema, vec![vec![text("Male")]]).unwrap();
        let cleaned = Cleaner::new().clean(&set);
        assert_eq!(cleaned.schema(), set.schema());
    }
}
