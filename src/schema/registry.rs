//! The schema registry: field definitions keyed by original name, plus the
//! derived export-name resolver.
//!
//! Checkbox fields export one column per choice (`field___code`), so the
//! registry maintains an export-name map kept in sync by every insert,
//! replace and remove. Branching-logic compilation is memoized per field and
//! stamped with a registry generation; any mutation bumps the generation and
//! stale entries are recompiled lazily on next access.

use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

use crate::error::{DictionaryError, Result};
use crate::logic::{self, LogicExpr};
use crate::schema::field::FieldDefinition;
use crate::schema::row::DictionaryRow;

#[derive(Debug, Clone)]
struct CachedLogic {
    generation: u64,
    expr: Arc<LogicExpr>,
}

/// Owner of all field definitions for one project.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    fields: FxHashMap<String, FieldDefinition>,
    /// Insertion order of `fields` keys
    order: Vec<String>,
    /// export name -> owning field name
    export_names: FxHashMap<String, String>,
    generation: u64,
    compiled: RwLock<FxHashMap<String, CachedLogic>>,
}

impl Clone for SchemaRegistry {
    /// Clones carry the definitions but start with a cold predicate cache.
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            order: self.order.clone(),
            export_names: self.export_names.clone(),
            generation: self.generation,
            compiled: RwLock::new(FxHashMap::default()),
        }
    }
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a batch of dictionary rows, in row order.
    pub fn from_rows(rows: impl IntoIterator<Item = DictionaryRow>) -> Result<Self> {
        let mut registry = Self::new();
        for row in rows {
            registry.insert_or_replace(FieldDefinition::from_row(&row)?)?;
        }
        log::debug!("loaded registry with {} fields", registry.len());
        Ok(registry)
    }

    /// Insert a definition, replacing any previous definition of the same
    /// field. Returns the replaced definition, if any.
    ///
    /// The export-name map is updated atomically with the field map; a new
    /// definition whose export names collide with another field's is rejected
    /// before anything is modified.
    pub fn insert_or_replace(
        &mut self,
        definition: FieldDefinition,
    ) -> Result<Option<FieldDefinition>> {
        definition.validate()?;
        let export_names = definition.export_names();
        for name in &export_names {
            if let Some(owner) = self.export_names.get(name) {
                if owner != &definition.field_name {
                    return Err(DictionaryError::InvalidDefinition {
                        field: definition.field_name.clone(),
                        reason: format!("export name {name:?} already owned by field {owner:?}"),
                    });
                }
            }
        }
        let previous = self.detach(&definition.field_name);
        if previous.is_none() {
            self.order.push(definition.field_name.clone());
        }
        for name in export_names {
            self.export_names
                .insert(name, definition.field_name.clone());
        }
        self.fields
            .insert(definition.field_name.clone(), definition);
        self.bump();
        Ok(previous)
    }

    /// Remove a field and all of its export names.
    pub fn remove(&mut self, field_name: &str) -> Option<FieldDefinition> {
        let removed = self.detach(field_name)?;
        self.order.retain(|name| name != field_name);
        self.bump();
        Some(removed)
    }

    /// Pull a field out of the maps without touching `order` or `generation`.
    fn detach(&mut self, field_name: &str) -> Option<FieldDefinition> {
        let removed = self.fields.remove(field_name)?;
        for name in removed.export_names() {
            self.export_names.remove(&name);
        }
        Some(removed)
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    /// Look up a definition by original field name only.
    #[must_use]
    pub fn field(&self, field_name: &str) -> Option<&FieldDefinition> {
        self.fields.get(field_name)
    }

    /// Look up a definition by original or export field name.
    pub fn get(&self, name: &str) -> Result<&FieldDefinition> {
        if let Some(def) = self.fields.get(name) {
            return Ok(def);
        }
        let owner = self.resolve_export_name(name)?;
        self.fields
            .get(owner)
            .ok_or_else(|| DictionaryError::UnknownField {
                name: name.to_string(),
            })
    }

    /// Map an export column name to its owning field name.
    ///
    /// Single-valued fields export under their own name; a checkbox field's
    /// bare name is not an export name, only its `field___code` columns are.
    pub fn resolve_export_name<'a>(&'a self, export_name: &str) -> Result<&'a str> {
        self.export_names
            .get(export_name)
            .map(String::as_str)
            .ok_or_else(|| DictionaryError::UnknownField {
                name: export_name.to_string(),
            })
    }

    /// Whether a name resolves, as original or export name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.export_names.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.order.iter().filter_map(|name| self.fields.get(name))
    }

    /// Dump every definition back to its wire row, in insertion order.
    #[must_use]
    pub fn rows(&self) -> Vec<DictionaryRow> {
        self.iter().map(FieldDefinition::to_row).collect()
    }

    /// Current mutation generation; bumped by every insert/replace/remove.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Compiled branching logic for a field, memoized per generation.
    ///
    /// The first access after any registry mutation recompiles; unchanged
    /// generations are served from the cache under a shared read lock.
    pub fn branching_logic(&self, field_name: &str) -> Result<Arc<LogicExpr>> {
        let def = self
            .field(field_name)
            .ok_or_else(|| DictionaryError::UnknownField {
                name: field_name.to_string(),
            })?;
        if let Ok(cache) = self.compiled.read() {
            if let Some(entry) = cache.get(field_name) {
                if entry.generation == self.generation {
                    return Ok(Arc::clone(&entry.expr));
                }
            }
        }
        let expr = Arc::new(logic::compile(&def.branching_logic, self)?);
        if let Ok(mut cache) = self.compiled.write() {
            cache.insert(
                field_name.to_string(),
                CachedLogic {
                    generation: self.generation,
                    expr: Arc::clone(&expr),
                },
            );
        }
        Ok(expr)
    }
}
