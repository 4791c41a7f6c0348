// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// The loader, cleaner, splitter and encoder return these typed
// errors so callers (and tests) can tell the failure classes
// apart. The application layer wraps them in anyhow with extra
// context; nothing in the pipeline recovers or retries.
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input not found: {0}")]
    NotFound(String),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited text: {0}")]
    Parse(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cannot stratify: {0}")]
    Stratification(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}
