// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads a comma-separated file with a header row into a
// RecordSet using the `csv` crate.
//
// Column types are decided ONCE per load:
//
//   inferred  — a column is Number when every non-blank cell
//               parses as a float (after trimming), else Text
//   declared  — `with_schema` skips inference; the header must
//               match the declared names and every cell must fit
//               its declared kind
//
// The declared mode is how a validation file is read against the
// schema inferred from its training file, so both sides agree on
// which columns are categorical.
//
// Blank cells become Value::Missing in either kind of column.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::{
    collections::HashSet,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use csv::ReaderBuilder;

use crate::domain::error::PipelineError;
use crate::domain::record::{Column, ColumnKind, RecordSet, Schema, Value};
use crate::domain::traits::RecordSource;

/// Loads one CSV file. Implements the RecordSource trait from Layer 3.
pub struct CsvLoader {
    path:   PathBuf,
    schema: Option<Schema>,
}

impl CsvLoader {
    /// Loader that infers column kinds from content
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), schema: None }
    }

    /// Validate against `schema` instead of inferring one
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvLoader {
    fn load(&self) -> Result<RecordSet, PipelineError> {
        let origin = self.path.display().to_string();

        if !self.path.exists() {
            return Err(PipelineError::NotFound(origin));
        }

        let file = File::open(&self.path).map_err(|source| PipelineError::Io {
            path: origin.clone(),
            source,
        })?;

        let records = parse_csv(file, &origin, self.schema.as_ref())?;
        tracing::info!(
            "Loaded {} rows x {} columns from '{}'",
            records.len(),
            records.schema().len(),
            origin
        );
        Ok(records)
    }
}

/// Parse CSV text from any reader. `origin` only labels error messages.
pub(crate) fn parse_csv<R: Read>(
    reader:   R,
    origin:   &str,
    declared: Option<&Schema>,
) -> Result<RecordSet, PipelineError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let header: Vec<String> = rdr
        .headers()
        .map_err(|e| csv_error(origin, e))?
        .iter()
        .map(str::to_string)
        .collect();

    if header.is_empty() || header.iter().all(|h| h.is_empty()) {
        return Err(PipelineError::Parse(format!("{origin}: missing header row")));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = header.iter().find(|h| !seen.insert(h.as_str())) {
        return Err(PipelineError::Parse(format!(
            "{origin}: duplicate column '{dup}' in header"
        )));
    }

    // ── Collect raw cells with their source line numbers ─────────────────────
    let mut raw: Vec<(u64, Vec<String>)> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(origin, e))?;
        let line   = record.position().map(|p| p.line()).unwrap_or(0);
        raw.push((line, record.iter().map(str::to_string).collect()));
    }

    let schema = match declared {
        Some(schema) => {
            check_header(origin, &header, schema)?;
            schema.clone()
        }
        None => infer_schema(&header, &raw),
    };
    tracing::debug!("Schema for '{}': {:?}", origin, schema.columns());

    // ── Convert every cell according to its column kind ───────────────────────
    let mut rows = Vec::with_capacity(raw.len());
    for (line, cells) in raw {
        let row = cells
            .into_iter()
            .zip(schema.columns())
            .map(|(cell, col)| convert_cell(origin, line, col, cell))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    RecordSet::new(schema, rows)
}

/// Number when at least one cell holds a value and every non-blank
/// cell parses as a float; Text otherwise.
fn infer_schema(header: &[String], raw: &[(u64, Vec<String>)]) -> Schema {
    let columns = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut any_value = false;
            let numeric = raw.iter().all(|(_, cells)| {
                let cell = &cells[i];
                if cell.is_empty() {
                    return true;
                }
                any_value = true;
                cell.trim().parse::<f64>().is_ok()
            });
            let kind = if numeric && any_value { ColumnKind::Number } else { ColumnKind::Text };
            Column::new(name.clone(), kind)
        })
        .collect();
    Schema::new(columns)
}

fn check_header(origin: &str, header: &[String], schema: &Schema) -> Result<(), PipelineError> {
    let matches = header.len() == schema.len()
        && header.iter().map(String::as_str).eq(schema.names());
    if matches {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch(format!(
            "{origin}: header [{}] does not match expected [{}]",
            header.join(", "),
            schema.names().collect::<Vec<_>>().join(", ")
        )))
    }
}

fn convert_cell(origin: &str, line: u64, col: &Column, cell: String) -> Result<Value, PipelineError> {
    if cell.is_empty() {
        return Ok(Value::Missing);
    }
    match col.kind {
        ColumnKind::Text => Ok(Value::Text(cell)),
        ColumnKind::Number => cell
            .trim()
            .parse::<f64>()
            .map(Value::number)
            .map_err(|_| {
                PipelineError::Parse(format!(
                    "{origin} line {line}: '{cell}' in numeric column '{}' is not a number",
                    col.name
                ))
            }),
    }
}

/// Split csv errors into I/O failures and malformed-text failures.
fn csv_error(origin: &str, err: csv::Error) -> PipelineError {
    let line    = err.position().map(|p| p.line());
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => PipelineError::Io { path: origin.to_string(), source },
        _ => match line {
            Some(line) => PipelineError::Parse(format!("{origin} line {line}: {message}")),
            None => PipelineError::Parse(format!("{origin}: {message}")),
        },
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const TELCO: &str = "\
customerID,gender,tenure,TotalCharges,Churn
7590-VHVEG,Female,1,29.85,No
5575-GNVDE, Male ,34,1889.5,No
3668-QPYBK,Male,0, ,Yes
";

    fn parse(text: &str) -> Result<RecordSet, PipelineError> {
        parse_csv(text.as_bytes(), "inline", None)
    }

    #[test]
    fn test_infers_column_kinds() {
        let set = parse(TELCO).unwrap();
        let kinds: Vec<ColumnKind> = set.schema().columns().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Text,
                ColumnKind::Text,
                ColumnKind::Number,
                // the blank " " entry keeps TotalCharges textual until cleaning
                ColumnKind::Text,
                ColumnKind::Text,
            ]
        );
        assert_eq!(set.len(), 3);
        assert_eq!(set.rows()[1][2], Value::Number(34.0));
    }

    #[test]
    fn test_loader_leaves_whitespace_alone() {
        let set = parse(TELCO).unwrap();
        assert_eq!(set.rows()[1][1], Value::Text(" Male ".into()));
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let set = parse("a,b\n1,x\n,\n3,z\n").unwrap();
        assert_eq!(set.schema().columns()[0].kind, ColumnKind::Number);
        assert!(set.rows()[1][0].is_missing());
        assert!(set.rows()[1][1].is_missing());
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let err = parse("a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_duplicate_header_is_parse_error() {
        let err = parse("a,a\n1,2\n").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = CsvLoader::new(dir.path().join("nope.csv")).load().unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[test]
    fn test_loads_from_disk() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, TELCO).unwrap();

        let set = CsvLoader::new(&path).load().unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.schema().contains("Churn"));
    }

    #[test]
    fn test_declared_schema_keeps_text_columns_textual() {
        let schema = Schema::new(vec![
            Column::new("code", ColumnKind::Text),
            Column::new("x", ColumnKind::Number),
        ]);
        let set = parse_csv("code,x\n1,2.5\n2,\n".as_bytes(), "inline", Some(&schema)).unwrap();
        assert_eq!(set.rows()[0][0], Value::Text("1".into()));
        assert!(set.rows()[1][1].is_missing());
    }

    #[test]
    fn test_declared_schema_rejects_other_header() {
        let schema = Schema::new(vec![Column::new("a", ColumnKind::Text)]);
        let err = parse_csv("b\nx\n".as_bytes(), "inline", Some(&schema)).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }

    #[test]
    fn test_declared_number_rejects_text() {
        let schema = Schema::new(vec![Column::new("a", ColumnKind::Number)]);
        let err = parse_csv("a\n1\nabc\n".as_bytes(), "inline", Some(&schema)).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }
}
