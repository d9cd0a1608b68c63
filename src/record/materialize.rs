//! Turning a raw exported record into a typed [`Record`].
//!
//! The algorithm: resolve every export column to its owning field, aggregate
//! checkbox columns, cast single values through the field's codec, then walk
//! the fields in branching-dependency order so each predicate sees the datums
//! it references already materialized. Materialization is all-or-nothing per
//! record.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::codec::DataValue;
use crate::config::MaterializeOptions;
use crate::error::{DictionaryError, Result};
use crate::logic::ast::CmpOp;
use crate::logic::eval::{Snapshot, compare_values, evaluate};
use crate::logic::{LogicExpr, TriState};
use crate::record::{RawValue, Record, RecordDatum};
use crate::schema::{EXPORT_CHOICE_SEPARATOR, FieldDefinition, FieldType, SchemaRegistry};

/// Raw input grouped under one owning field.
enum Grouped<'a> {
    Single(&'a str),
    /// (choice code, raw string) pairs for the export columns present
    Choices(Vec<(String, &'a str)>),
}

/// A checkbox column is selected unless empty or literal "0".
fn truthy(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed != "0"
}

/// The in-progress record the branching evaluator reads from.
struct PartialRecord<'a> {
    datums: &'a FxHashMap<String, RecordDatum>,
}

impl Snapshot for PartialRecord<'_> {
    fn field_value(&self, field: &str) -> Option<DataValue> {
        self.datums.get(field).and_then(|d| d.typed.clone())
    }

    fn choice_value(&self, field: &str, code: &str) -> Option<bool> {
        self.datums
            .get(field)
            .and_then(|d| d.choice_values.as_ref())
            .and_then(|choices| choices.get(code).copied())
    }
}

/// Materialize one raw record with default options.
pub fn materialize(raw: &HashMap<String, String>, registry: &SchemaRegistry) -> Result<Record> {
    materialize_with(raw, registry, &MaterializeOptions::default())
}

/// Materialize one raw record.
pub fn materialize_with(
    raw: &HashMap<String, String>,
    registry: &SchemaRegistry,
    options: &MaterializeOptions,
) -> Result<Record> {
    let mut grouped: FxHashMap<&str, Grouped> = FxHashMap::default();
    for (key, value) in raw {
        let owner = match registry.resolve_export_name(key) {
            Ok(owner) => owner,
            Err(err) if options.ignore_unknown_fields => {
                log::debug!("skipping unknown export column {key:?}: {err}");
                continue;
            }
            Err(err) => return Err(err),
        };
        let def = registry
            .field(owner)
            .ok_or_else(|| DictionaryError::UnknownField {
                name: owner.to_string(),
            })?;
        if def.field_type == FieldType::Checkbox {
            let prefix = format!("{owner}{EXPORT_CHOICE_SEPARATOR}");
            let code = key.strip_prefix(&prefix).unwrap_or_default().to_string();
            match grouped
                .entry(owner)
                .or_insert_with(|| Grouped::Choices(Vec::new()))
            {
                Grouped::Choices(pairs) => pairs.push((code, value.as_str())),
                Grouped::Single(_) => unreachable!("checkbox field grouped as single"),
            }
        } else {
            grouped.insert(owner, Grouped::Single(value.as_str()));
        }
    }

    // Fields present in this record, in dictionary order.
    let present: Vec<&FieldDefinition> = registry
        .iter()
        .filter(|def| grouped.contains_key(def.field_name.as_str()))
        .collect();

    let mut predicates: Vec<Arc<LogicExpr>> = Vec::with_capacity(present.len());
    for def in &present {
        predicates.push(registry.branching_logic(&def.field_name)?);
    }

    let order = dependency_order(&present, &predicates)?;

    let mut datums: FxHashMap<String, RecordDatum> = FxHashMap::default();
    for i in order {
        let def = present[i];
        let branching = evaluate(&predicates[i], &PartialRecord { datums: &datums });
        let datum = match grouped.get(def.field_name.as_str()) {
            Some(Grouped::Single(value)) => single_datum(def, value, branching)?,
            Some(Grouped::Choices(pairs)) => checkbox_datum(def, pairs, branching),
            None => continue,
        };
        datums.insert(def.field_name.clone(), datum);
    }

    Ok(Record::from_data(
        present
            .iter()
            .filter_map(|def| datums.remove(&def.field_name))
            .collect(),
    ))
}

/// Evaluation order: every field after the fields its predicate references.
///
/// Only references between fields present in this record constrain the
/// order; a reference to an absent field simply evaluates `Unknown`. A cycle
/// among present fields aborts the record.
fn dependency_order(
    present: &[&FieldDefinition],
    predicates: &[Arc<LogicExpr>],
) -> Result<Vec<usize>> {
    let index_of: FxHashMap<&str, usize> = present
        .iter()
        .enumerate()
        .map(|(i, def)| (def.field_name.as_str(), i))
        .collect();
    let deps: Vec<Vec<usize>> = predicates
        .iter()
        .map(|expr| {
            expr.referenced_fields()
                .into_iter()
                .filter_map(|field| index_of.get(field).copied())
                .collect()
        })
        .collect();

    let mut done = vec![false; present.len()];
    let mut order = Vec::with_capacity(present.len());
    while order.len() < present.len() {
        let ready = (0..present.len())
            .find(|&i| !done[i] && deps[i].iter().all(|&dep| done[dep] || dep == i));
        match ready {
            Some(i) if deps[i].contains(&i) => {
                // A field gating itself is the smallest possible cycle.
                return Err(DictionaryError::CyclicBranchingLogic {
                    field: present[i].field_name.clone(),
                });
            }
            Some(i) => {
                done[i] = true;
                order.push(i);
            }
            None => {
                let stuck = (0..present.len()).find(|&i| !done[i]).unwrap_or_default();
                return Err(DictionaryError::CyclicBranchingLogic {
                    field: present[stuck].field_name.clone(),
                });
            }
        }
    }
    Ok(order)
}

fn single_datum(def: &FieldDefinition, value: &str, branching: TriState) -> Result<RecordDatum> {
    let typed = if value.trim().is_empty() {
        None
    } else {
        Some(def.validation.parse(value)?)
    };
    let mut valid = !(def.required && typed.is_none());
    if let Some(typed_value) = &typed {
        if !bound_ok(def, &def.validation_min, typed_value, CmpOp::Ge) {
            valid = false;
        }
        if !bound_ok(def, &def.validation_max, typed_value, CmpOp::Le) {
            valid = false;
        }
    }
    Ok(RecordDatum {
        field_name: def.field_name.clone(),
        raw: RawValue::Single(value.to_string()),
        typed,
        choice_values: None,
        branching,
        valid,
    })
}

/// True when the bound is absent, unparseable (ignored with a warning), or
/// satisfied.
fn bound_ok(def: &FieldDefinition, bound: &str, value: &DataValue, op: CmpOp) -> bool {
    if bound.is_empty() {
        return true;
    }
    match def.validation.parse(bound) {
        Ok(limit) => compare_values(value, op, &limit),
        Err(_) => {
            log::warn!(
                "field {}: unparseable validation bound {:?}, ignoring",
                def.field_name,
                bound
            );
            true
        }
    }
}

fn checkbox_datum(
    def: &FieldDefinition,
    pairs: &[(String, &str)],
    branching: TriState,
) -> RecordDatum {
    // Declared choices absent from the export count as unselected, so the
    // aggregate is computable even from a partial export.
    let mut choice_values: BTreeMap<String, bool> = def
        .choices
        .iter()
        .map(|c| (c.code.clone(), false))
        .collect();
    let mut raw_values = BTreeMap::new();
    for (code, value) in pairs {
        choice_values.insert(code.clone(), truthy(value));
        raw_values.insert(code.clone(), (*value).to_string());
    }
    let any_selected = choice_values.values().any(|v| *v);
    // An unresolved branching condition is non-blocking; only a field that is
    // definitely shown and left unanswered is invalid.
    let valid = !(branching == TriState::Shown && !any_selected);
    RecordDatum {
        field_name: def.field_name.clone(),
        raw: RawValue::Choices(raw_values),
        typed: Some(DataValue::Bool(any_selected)),
        choice_values: Some(choice_values),
        branching,
        valid,
    }
}

/// Materialize a record delivered as one JSON object, as produced by the
/// export API. Non-string values are stringified before casting.
pub fn materialize_json(raw_json: &str, registry: &SchemaRegistry) -> Result<Record> {
    let parsed: HashMap<String, serde_json::Value> =
        serde_json::from_str(raw_json).map_err(|err| DictionaryError::MalformedValue {
            raw: err.to_string(),
            tag: "record json".to_string(),
        })?;
    let raw: HashMap<String, String> = parsed
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect();
    materialize(&raw, registry)
}

/// Materialize many records in parallel against a shared read-only registry.
///
/// Records are independent, so this is a straight data-parallel fan-out; the
/// result order matches the input order.
pub fn materialize_batch(
    raws: &[HashMap<String, String>],
    registry: &SchemaRegistry,
) -> Vec<Result<Record>> {
    raws.par_iter()
        .map(|raw| materialize(raw, registry))
        .collect()
}
