//! Field definitions: one row of the data dictionary, typed.

use smallvec::SmallVec;
use std::fmt;

use crate::codec::ValidationType;
use crate::error::{DictionaryError, Result};

/// Separator between a checkbox field's name and a choice code in export
/// column names.
pub const EXPORT_CHOICE_SEPARATOR: &str = "___";

/// The twelve field types of the source dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Notes,
    Dropdown,
    Radio,
    Checkbox,
    File,
    Calc,
    Sql,
    Descriptive,
    Slider,
    YesNo,
    TrueFalse,
}

impl FieldType {
    /// Resolve the dictionary's `field_type` column value.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "text" => Ok(Self::Text),
            "notes" => Ok(Self::Notes),
            "dropdown" => Ok(Self::Dropdown),
            "radio" => Ok(Self::Radio),
            "checkbox" => Ok(Self::Checkbox),
            "file" => Ok(Self::File),
            "calc" => Ok(Self::Calc),
            "sql" => Ok(Self::Sql),
            "descriptive" => Ok(Self::Descriptive),
            "slider" => Ok(Self::Slider),
            "yesno" => Ok(Self::YesNo),
            "truefalse" => Ok(Self::TrueFalse),
            other => Err(DictionaryError::InvalidDefinition {
                field: String::new(),
                reason: format!("unknown field type {other:?}"),
            }),
        }
    }

    /// The dictionary's column value for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Notes => "notes",
            Self::Dropdown => "dropdown",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::File => "file",
            Self::Calc => "calc",
            Self::Sql => "sql",
            Self::Descriptive => "descriptive",
            Self::Slider => "slider",
            Self::YesNo => "yesno",
            Self::TrueFalse => "truefalse",
        }
    }

    /// Whether `select_choices_or_calculations` carries enumerated choices
    /// for this type (as opposed to a calculation or nothing).
    #[must_use]
    pub const fn has_choices(self) -> bool {
        matches!(self, Self::Dropdown | Self::Radio | Self::Checkbox)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(code, label)` pair of a choice-bearing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub code: String,
    pub label: String,
}

/// Parse the dictionary's `"code, label | code, label"` choice encoding.
pub(crate) fn parse_choices(raw: &str) -> SmallVec<[Choice; 4]> {
    raw.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once(',') {
            Some((code, label)) => Choice {
                code: code.trim().to_string(),
                label: label.trim().to_string(),
            },
            None => Choice {
                code: part.to_string(),
                label: String::new(),
            },
        })
        .collect()
}

/// Inverse of [`parse_choices`].
pub(crate) fn format_choices(choices: &[Choice]) -> String {
    choices
        .iter()
        .map(|c| format!("{}, {}", c.code, c.label))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// One field's full metadata definition.
///
/// `field_name` is the field's immutable identity within a registry. The
/// presentation attributes at the bottom are carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub field_name: String,
    pub form_name: String,
    pub section_header: String,
    pub field_type: FieldType,
    pub field_label: String,
    /// Ordered choices; populated only for choice-bearing field types
    pub choices: SmallVec<[Choice; 4]>,
    /// Raw `select_choices_or_calculations` content for non-choice types
    /// (a formula for `calc` fields), kept for round-tripping
    pub calculation: String,
    pub field_note: String,
    /// Codec selected by `text_validation_type_or_show_slider_number`
    pub validation: ValidationType,
    /// Raw minimum bound, interpreted by the field's own codec
    pub validation_min: String,
    /// Raw maximum bound, interpreted by the field's own codec
    pub validation_max: String,
    pub identifier: bool,
    /// Raw branching logic in dictionary syntax; empty means "always show"
    pub branching_logic: String,
    pub required: bool,
    pub custom_alignment: String,
    pub question_number: String,
    pub matrix_group_name: String,
    pub matrix_ranking: String,
    pub field_annotation: String,
}

impl FieldDefinition {
    /// Create a minimal definition; the `with_*` builders fill in the rest.
    pub fn new(
        field_name: impl Into<String>,
        form_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            form_name: form_name.into(),
            section_header: String::new(),
            field_type,
            field_label: String::new(),
            choices: SmallVec::new(),
            calculation: String::new(),
            field_note: String::new(),
            validation: ValidationType::None,
            validation_min: String::new(),
            validation_max: String::new(),
            identifier: false,
            branching_logic: String::new(),
            required: false,
            custom_alignment: String::new(),
            question_number: String::new(),
            matrix_group_name: String::new(),
            matrix_ranking: String::new(),
            field_annotation: String::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.field_label = label.into();
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validation: ValidationType) -> Self {
        self.validation = validation;
        self
    }

    #[must_use]
    pub fn with_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.validation_min = min.into();
        self.validation_max = max.into();
        self
    }

    #[must_use]
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = (String, String)>) -> Self {
        self.choices = choices
            .into_iter()
            .map(|(code, label)| Choice { code, label })
            .collect();
        self
    }

    #[must_use]
    pub fn with_branching_logic(mut self, raw: impl Into<String>) -> Self {
        self.branching_logic = raw.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Whether a choice code is declared on this field.
    #[must_use]
    pub fn has_choice(&self, code: &str) -> bool {
        self.choices.iter().any(|c| c.code == code)
    }

    /// The column names this field contributes to exported records: the
    /// field name itself, or one `field___code` column per checkbox choice.
    #[must_use]
    pub fn export_names(&self) -> Vec<String> {
        if self.field_type == FieldType::Checkbox {
            self.choices
                .iter()
                .map(|c| format!("{}{}{}", self.field_name, EXPORT_CHOICE_SEPARATOR, c.code))
                .collect()
        } else {
            vec![self.field_name.clone()]
        }
    }

    /// Enforce the per-definition invariants: a non-empty name, and unique
    /// choice codes within the field.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.field_name.is_empty() {
            return Err(DictionaryError::InvalidDefinition {
                field: String::new(),
                reason: "empty field name".to_string(),
            });
        }
        for (i, choice) in self.choices.iter().enumerate() {
            if self.choices[..i].iter().any(|c| c.code == choice.code) {
                return Err(DictionaryError::InvalidDefinition {
                    field: self.field_name.clone(),
                    reason: format!("duplicate choice code {:?}", choice.code),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_encoding_round_trips() {
        let choices = parse_choices("1, Red | 2, Blue | 10, Light blue");
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0].code, "1");
        assert_eq!(choices[2].label, "Light blue");
        assert_eq!(format_choices(&choices), "1, Red | 2, Blue | 10, Light blue");
    }

    #[test]
    fn labels_may_contain_commas() {
        let choices = parse_choices("1, Red, bright | 2, Blue");
        assert_eq!(choices[0].label, "Red, bright");
    }

    #[test]
    fn checkbox_exports_one_column_per_choice() {
        let field = FieldDefinition::new("likes", "survey", FieldType::Checkbox)
            .with_choices([("1".into(), "Red".into()), ("2".into(), "Blue".into())]);
        assert_eq!(field.export_names(), vec!["likes___1", "likes___2"]);

        let field = FieldDefinition::new("age", "survey", FieldType::Text);
        assert_eq!(field.export_names(), vec!["age"]);
    }

    #[test]
    fn duplicate_choice_codes_are_rejected() {
        let field = FieldDefinition::new("likes", "survey", FieldType::Checkbox)
            .with_choices([("1".into(), "Red".into()), ("1".into(), "Crimson".into())]);
        assert!(field.validate().is_err());
    }
}
