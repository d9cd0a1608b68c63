//! A Rust library exposing a data-capture project's data dictionary as a
//! runtime schema, with safe branching-logic evaluation, typed record
//! casting (including the `field___choice` checkbox encoding), and additive
//! SQL migration generation.

pub mod codec;
pub mod config;
pub mod error;
pub mod logic;
pub mod migration;
pub mod record;
pub mod schema;

// Re-export the most common types for easier use
// Core types
pub use config::MaterializeOptions;
pub use error::{DictionaryError, Result};
pub use schema::{DictionaryRow, FieldDefinition, FieldType, SchemaRegistry};

// Codec and logic
pub use codec::{DataValue, ValidationType};
pub use logic::{LogicExpr, TriState, ValueSnapshot, compile, evaluate, render};

// Record materialization
pub use record::{Record, RecordDatum};
pub use record::{materialize, materialize_batch, materialize_json, materialize_with};
