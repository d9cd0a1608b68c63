//! The 18-column dictionary row as exchanged with the data-capture service.
//!
//! Column names and the `"y"` boolean convention are fixed by the export API;
//! this module is the only place that knows about them.

use serde::{Deserialize, Serialize};

use crate::codec::ValidationType;
use crate::error::Result;
use crate::schema::field::{FieldDefinition, FieldType, format_choices, parse_choices};

/// The dictionary's column names, in export order.
pub const DICTIONARY_COLUMNS: [&str; 18] = [
    "field_name",
    "form_name",
    "section_header",
    "field_type",
    "field_label",
    "select_choices_or_calculations",
    "field_note",
    "text_validation_type_or_show_slider_number",
    "text_validation_min",
    "text_validation_max",
    "identifier",
    "branching_logic",
    "required_field",
    "custom_alignment",
    "question_number",
    "matrix_group_name",
    "matrix_ranking",
    "field_annotation",
];

/// One raw dictionary row; every column is a string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRow {
    pub field_name: String,
    #[serde(default)]
    pub form_name: String,
    #[serde(default)]
    pub section_header: String,
    pub field_type: String,
    #[serde(default)]
    pub field_label: String,
    #[serde(default)]
    pub select_choices_or_calculations: String,
    #[serde(default)]
    pub field_note: String,
    #[serde(default)]
    pub text_validation_type_or_show_slider_number: String,
    #[serde(default)]
    pub text_validation_min: String,
    #[serde(default)]
    pub text_validation_max: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub branching_logic: String,
    #[serde(default)]
    pub required_field: String,
    #[serde(default)]
    pub custom_alignment: String,
    #[serde(default)]
    pub question_number: String,
    #[serde(default)]
    pub matrix_group_name: String,
    #[serde(default)]
    pub matrix_ranking: String,
    #[serde(default)]
    pub field_annotation: String,
}

impl DictionaryRow {
    /// Column value by dictionary column name, for attribute-driven grouping.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&str> {
        let value = match name {
            "field_name" => &self.field_name,
            "form_name" => &self.form_name,
            "section_header" => &self.section_header,
            "field_type" => &self.field_type,
            "field_label" => &self.field_label,
            "select_choices_or_calculations" => &self.select_choices_or_calculations,
            "field_note" => &self.field_note,
            "text_validation_type_or_show_slider_number" => {
                &self.text_validation_type_or_show_slider_number
            }
            "text_validation_min" => &self.text_validation_min,
            "text_validation_max" => &self.text_validation_max,
            "identifier" => &self.identifier,
            "branching_logic" => &self.branching_logic,
            "required_field" => &self.required_field,
            "custom_alignment" => &self.custom_alignment,
            "question_number" => &self.question_number,
            "matrix_group_name" => &self.matrix_group_name,
            "matrix_ranking" => &self.matrix_ranking,
            "field_annotation" => &self.field_annotation,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// `identifier`/`required_field` convention: `"y"` is true, anything else is
/// false.
fn load_flag(value: &str) -> bool {
    value == "y"
}

fn dump_flag(value: bool) -> &'static str {
    if value { "y" } else { "n" }
}

impl FieldDefinition {
    /// Build a typed definition from a raw dictionary row.
    ///
    /// An unrecognized validation tag loads as pass-through text with a
    /// warning; an unrecognized field type is an error.
    pub fn from_row(row: &DictionaryRow) -> Result<Self> {
        let field_type = FieldType::from_name(&row.field_type).map_err(|err| match err {
            crate::error::DictionaryError::InvalidDefinition { reason, .. } => {
                crate::error::DictionaryError::InvalidDefinition {
                    field: row.field_name.clone(),
                    reason,
                }
            }
            other => other,
        })?;
        let validation = ValidationType::from_tag(&row.text_validation_type_or_show_slider_number);
        if !validation.is_known() {
            log::warn!(
                "field {}: unknown validation tag {:?}, treating as text",
                row.field_name,
                row.text_validation_type_or_show_slider_number
            );
        }
        let (choices, calculation) = if field_type.has_choices() {
            (parse_choices(&row.select_choices_or_calculations), String::new())
        } else {
            (Default::default(), row.select_choices_or_calculations.clone())
        };
        let def = Self {
            field_name: row.field_name.clone(),
            form_name: row.form_name.clone(),
            section_header: row.section_header.clone(),
            field_type,
            field_label: row.field_label.clone(),
            choices,
            calculation,
            field_note: row.field_note.clone(),
            validation,
            validation_min: row.text_validation_min.clone(),
            validation_max: row.text_validation_max.clone(),
            identifier: load_flag(&row.identifier),
            branching_logic: row.branching_logic.clone(),
            required: load_flag(&row.required_field),
            custom_alignment: row.custom_alignment.clone(),
            question_number: row.question_number.clone(),
            matrix_group_name: row.matrix_group_name.clone(),
            matrix_ranking: row.matrix_ranking.clone(),
            field_annotation: row.field_annotation.clone(),
        };
        def.validate()?;
        Ok(def)
    }

    /// Dump back to the wire shape; inverse of [`Self::from_row`].
    #[must_use]
    pub fn to_row(&self) -> DictionaryRow {
        DictionaryRow {
            field_name: self.field_name.clone(),
            form_name: self.form_name.clone(),
            section_header: self.section_header.clone(),
            field_type: self.field_type.as_str().to_string(),
            field_label: self.field_label.clone(),
            select_choices_or_calculations: if self.field_type.has_choices() {
                format_choices(&self.choices)
            } else {
                self.calculation.clone()
            },
            field_note: self.field_note.clone(),
            text_validation_type_or_show_slider_number: self.validation.tag().to_string(),
            text_validation_min: self.validation_min.clone(),
            text_validation_max: self.validation_max.clone(),
            identifier: dump_flag(self.identifier).to_string(),
            branching_logic: self.branching_logic.clone(),
            required_field: dump_flag(self.required).to_string(),
            custom_alignment: self.custom_alignment.clone(),
            question_number: self.question_number.clone(),
            matrix_group_name: self.matrix_group_name.clone(),
            matrix_ranking: self.matrix_ranking.clone(),
            field_annotation: self.field_annotation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> DictionaryRow {
        DictionaryRow {
            field_name: "weight".to_string(),
            form_name: "vitals".to_string(),
            field_type: "text".to_string(),
            field_label: "Weight (kg)".to_string(),
            text_validation_type_or_show_slider_number: "number_1dp".to_string(),
            text_validation_min: "20".to_string(),
            text_validation_max: "300".to_string(),
            required_field: "y".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn row_round_trips_through_definition() {
        let row = sample_row();
        let def = FieldDefinition::from_row(&row).unwrap();
        assert!(def.required);
        assert!(!def.identifier);
        assert_eq!(def.validation.tag(), "number_1dp");
        let dumped = def.to_row();
        assert_eq!(dumped.field_name, row.field_name);
        assert_eq!(dumped.text_validation_type_or_show_slider_number, "number_1dp");
        assert_eq!(dumped.required_field, "y");
        assert_eq!(dumped.identifier, "n");
    }

    #[test]
    fn checkbox_rows_parse_their_choices() {
        let row = DictionaryRow {
            field_name: "likes".to_string(),
            form_name: "survey".to_string(),
            field_type: "checkbox".to_string(),
            select_choices_or_calculations: "1, Red | 2, Blue".to_string(),
            ..Default::default()
        };
        let def = FieldDefinition::from_row(&row).unwrap();
        assert_eq!(def.choices.len(), 2);
        assert_eq!(def.to_row().select_choices_or_calculations, "1, Red | 2, Blue");
    }

    #[test]
    fn calc_rows_keep_their_formula_verbatim() {
        let row = DictionaryRow {
            field_name: "bmi".to_string(),
            form_name: "vitals".to_string(),
            field_type: "calc".to_string(),
            select_choices_or_calculations: "[weight]/(([height])^(2))".to_string(),
            ..Default::default()
        };
        let def = FieldDefinition::from_row(&row).unwrap();
        assert!(def.choices.is_empty());
        assert_eq!(def.to_row().select_choices_or_calculations, "[weight]/(([height])^(2))");
    }

    #[test]
    fn rows_parse_from_export_json() {
        let json = r#"{
            "field_name": "patient_id",
            "form_name": "demographics",
            "section_header": "",
            "field_type": "text",
            "field_label": "Patient ID",
            "select_choices_or_calculations": "",
            "field_note": "",
            "text_validation_type_or_show_slider_number": "",
            "text_validation_min": "",
            "text_validation_max": "",
            "identifier": "y",
            "branching_logic": "",
            "required_field": "",
            "custom_alignment": "",
            "question_number": "",
            "matrix_group_name": "",
            "matrix_ranking": "",
            "field_annotation": ""
        }"#;
        let row: DictionaryRow = serde_json::from_str(json).unwrap();
        let def = FieldDefinition::from_row(&row).unwrap();
        assert!(def.identifier);
        assert_eq!(def.field_type, FieldType::Text);
    }

    #[test]
    fn column_accessor_knows_all_columns() {
        let row = sample_row();
        for name in DICTIONARY_COLUMNS {
            assert!(row.column(name).is_some(), "missing column {name}");
        }
        assert!(row.column("not_a_column").is_none());
        assert_eq!(row.column("form_name"), Some("vitals"));
    }
}
