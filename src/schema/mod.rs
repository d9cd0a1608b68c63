//! The schema system: typed field definitions, the dictionary wire rows, and
//! the registry that resolves original and export names.

pub mod field;
pub mod registry;
pub mod row;

pub use field::{Choice, EXPORT_CHOICE_SEPARATOR, FieldDefinition, FieldType};
pub use registry::SchemaRegistry;
pub use row::{DICTIONARY_COLUMNS, DictionaryRow};
