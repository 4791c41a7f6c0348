// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types that every other layer speaks in:
//
//   record.rs  — Value, Schema and RecordSet (the tabular data)
//   encoded.rs — numeric feature matrices and label vectors
//   error.rs   — the pipeline's error taxonomy
//   traits.rs  — seams other layers implement
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Tabular records with an explicit column schema
pub mod record;

// Encoder output handed to the classifier
pub mod encoded;

// Error taxonomy shared by the data layer
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
