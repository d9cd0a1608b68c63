//! Error handling for the dictionary core.

/// Specialized error type for schema, codec, logic and materialization
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// A lookup by original or export field name found nothing
    #[error("unknown field: {name}")]
    UnknownField {
        /// The name that failed to resolve
        name: String,
    },

    /// A raw value could not be cast by the field's validation codec
    #[error("malformed value {raw:?} for validation type {tag:?}")]
    MalformedValue {
        /// The offending raw string
        raw: String,
        /// The validation type tag that rejected it
        tag: String,
    },

    /// A branching-logic string could not be parsed
    #[error("branching logic syntax error at byte {position}: {fragment:?}")]
    Syntax {
        /// The offending fragment of the input
        fragment: String,
        /// Byte offset of the fragment in the raw string
        position: usize,
    },

    /// Branching logic of the fields in a record forms a reference cycle
    #[error("cyclic branching logic involving field {field}")]
    CyclicBranchingLogic {
        /// One field on the cycle
        field: String,
    },

    /// Invalid configuration, e.g. an unknown migration grouping column
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A field definition violates a dictionary invariant
    #[error("invalid definition for field {field}: {reason}")]
    InvalidDefinition {
        /// The field being defined
        field: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Result type for dictionary operations
pub type Result<T> = std::result::Result<T, DictionaryError>;
