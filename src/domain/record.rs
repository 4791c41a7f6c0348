// ============================================================
// Layer 3 — Record Set Domain Types
// ============================================================
// A record set is an ordered collection of rows that all share
// one column schema:
//
//   Schema    [customerID: Text] [tenure: Number] [Churn: Text]
//   Row 0     "7590-VHVEG"        1                "No"
//   Row 1     "5575-GNVDE"        34               "No"
//   Row 2     "3668-QPYBK"        2                "Yes"
//
// Every cell is a Value: text, a finite number, or missing.
// Row identity is positional — there is no explicit row ID.
//
// Reference: Rust Book §6 (Enums), §8 (Collections)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::domain::error::PipelineError;

// ─── Value ────────────────────────────────────────────────────────────────────
/// A single cell.
///
/// `Number` only ever holds finite floats; loaders map NaN and
/// infinities to `Missing`, which keeps `Eq` and `Hash` honest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Number(f64),
    Missing,
}

impl Value {
    /// Build a numeric cell, mapping non-finite input to `Missing`.
    pub fn number(x: f64) -> Self {
        if x.is_finite() {
            Value::Number(x)
        } else {
            Value::Missing
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }
}

// Missing == Missing so duplicate detection treats two blank cells alike
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Missing, Value::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            // 0.0 and -0.0 compare equal, so they must hash equal too
            Value::Number(x) if *x == 0.0 => 0u64.hash(state),
            Value::Number(x) => x.to_bits().hash(state),
            Value::Missing => {}
        }
    }
}

/// CSV rendering: text verbatim, numbers in shortest round-trip
/// form (`1.0` prints as `1`), missing as an empty cell.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(x) => write!(f, "{x}"),
            Value::Missing => Ok(()),
        }
    }
}

// ─── Schema ───────────────────────────────────────────────────────────────────
/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Text,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self { name: name.into(), kind }
    }
}

/// Ordered column declarations. Inferred once from a file, then
/// reused to validate any later file that must share it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Copy of this schema with one column's kind replaced.
    pub fn with_kind(&self, index: usize, kind: ColumnKind) -> Self {
        let mut columns = self.columns.clone();
        if let Some(col) = columns.get_mut(index) {
            col.kind = kind;
        }
        Self { columns }
    }
}

// ─── RecordSet ────────────────────────────────────────────────────────────────
/// Rows sharing one schema. Every transform returns a new set;
/// nothing mutates a record set after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    schema: Schema,
    rows:   Vec<Vec<Value>>,
}

impl RecordSet {
    /// Build a record set, rejecting rows whose width differs
    /// from the schema.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Result<Self, PipelineError> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != schema.len())
        {
            return Err(PipelineError::SchemaMismatch(format!(
                "row {i} has {} values but the schema has {} columns",
                row.len(),
                schema.len()
            )));
        }
        Ok(Self { schema, rows })
    }

    /// For transforms that only reorder, filter or rewrite cells of
    /// rows already validated against `schema`.
    pub(crate) fn from_trusted(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == schema.len()));
        Self { schema, rows }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// New record set holding the rows at `indices`, in that order.
    /// Indices out of range are skipped.
    pub fn select(&self, indices: &[usize]) -> RecordSet {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        RecordSet { schema: self.schema.clone(), rows }
    }

    pub fn into_parts(self) -> (Schema, Vec<Vec<Value>>) {
        (self.schema, self.rows)
    }
}
