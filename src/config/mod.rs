//! Configuration for record materialization.

/// Options controlling how raw exported records are materialized.
#[derive(Debug, Clone, Default)]
pub struct MaterializeOptions {
    /// Skip export columns that resolve to no dictionary field instead of
    /// failing the record. Real exports carry bookkeeping columns (e.g.
    /// form-complete markers) that are not part of the dictionary.
    pub ignore_unknown_fields: bool,
}
