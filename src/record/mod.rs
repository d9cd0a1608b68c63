//! Materialized records: typed, validity-annotated field data.
//!
//! Each logical field is an explicit [`RecordDatum`] value stored in an
//! ordered, immutable [`Record`].

pub mod materialize;

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::codec::DataValue;
use crate::logic::TriState;

pub use materialize::{materialize, materialize_batch, materialize_json, materialize_with};

/// The raw exported form of one logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// A single exported column
    Single(String),
    /// Checkbox: raw string per choice code, for the columns that were
    /// present in the export
    Choices(BTreeMap<String, String>),
}

/// The materialized result for one logical field within one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDatum {
    /// Owning field's original name
    pub field_name: String,
    /// Raw value(s) as exported
    pub raw: RawValue,
    /// Typed value; `None` when the raw value was empty. Checkbox fields
    /// carry the "any choice selected" aggregate as [`DataValue::Bool`].
    pub typed: Option<DataValue>,
    /// Per-choice selection state; present only for checkbox fields, and
    /// covers every declared choice (absent export columns count as false)
    pub choice_values: Option<BTreeMap<String, bool>>,
    /// Branching-logic outcome for this field within this record
    pub branching: TriState,
    /// Validation verdict per the field's validation and required rules
    pub valid: bool,
}

impl RecordDatum {
    /// Whether any checkbox choice is selected; false for non-checkbox data.
    #[must_use]
    pub fn any_selected(&self) -> bool {
        self.choice_values
            .as_ref()
            .is_some_and(|choices| choices.values().any(|v| *v))
    }
}

/// One materialized record: an ordered mapping `field_name -> RecordDatum`.
///
/// Records are never mutated after creation; re-materialize to change one.
#[derive(Debug, Clone, Default)]
pub struct Record {
    data: Vec<RecordDatum>,
    index: FxHashMap<String, usize>,
}

impl Record {
    pub(crate) fn from_data(data: Vec<RecordDatum>) -> Self {
        let index = data
            .iter()
            .enumerate()
            .map(|(i, d)| (d.field_name.clone(), i))
            .collect();
        Self { data, index }
    }

    #[must_use]
    pub fn get(&self, field_name: &str) -> Option<&RecordDatum> {
        self.index.get(field_name).map(|i| &self.data[*i])
    }

    #[must_use]
    pub fn contains(&self, field_name: &str) -> bool {
        self.index.contains_key(field_name)
    }

    /// Iterate datums in registry (dictionary) order.
    pub fn iter(&self) -> impl Iterator<Item = &RecordDatum> {
        self.data.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a RecordDatum;
    type IntoIter = std::slice::Iter<'a, RecordDatum>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
