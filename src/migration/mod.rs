//! Additive SQL migration generation from field definitions.
//!
//! Fields are grouped by a chosen dictionary column (typically `field_type`
//! or `form_name`) into one table per group. All statements are
//! `IF NOT EXISTS`, so applying the output repeatedly is a no-op, and the
//! output is byte-deterministic for a given registry.

use itertools::Itertools;
use std::fmt::Write;

use crate::error::{DictionaryError, Result};
use crate::schema::{DICTIONARY_COLUMNS, SchemaRegistry};

/// Generate dialect-agnostic DDL for every field in the registry.
///
/// `group_by` must be one of the 18 dictionary column names; it selects the
/// attribute whose value names each table. `schema` optionally prefixes
/// table names and adds a `CREATE SCHEMA` statement.
pub fn generate(
    registry: &SchemaRegistry,
    group_by: &str,
    schema: Option<&str>,
) -> Result<String> {
    if !DICTIONARY_COLUMNS.contains(&group_by) {
        return Err(DictionaryError::Configuration(format!(
            "invalid table grouping column {group_by:?}"
        )));
    }

    let mut out = String::new();
    let prefix = match schema {
        Some(name) => {
            let _ = writeln!(out, "CREATE SCHEMA IF NOT EXISTS {name};");
            format!("{name}.")
        }
        None => String::new(),
    };

    // Stable sort: groups ordered by key, fields within a group keep their
    // dictionary order.
    let mut fields: Vec<_> = registry
        .iter()
        .map(|def| {
            let row = def.to_row();
            let key = row.column(group_by).unwrap_or_default().to_string();
            (key, def)
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (table, group) in &fields.iter().chunk_by(|(key, _)| key.clone()) {
        let _ = writeln!(out, "CREATE TABLE IF NOT EXISTS {prefix}{table}();");
        for (_, def) in group {
            let _ = writeln!(
                out,
                "ALTER TABLE {prefix}{table} ADD COLUMN IF NOT EXISTS {} {};",
                def.field_name,
                def.validation.sql_type()
            );
        }
    }
    log::debug!(
        "generated migration for {} fields grouped by {group_by}",
        registry.len()
    );
    Ok(out)
}
