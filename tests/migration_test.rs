use redcap_schema::schema::DictionaryRow;
use redcap_schema::{DictionaryError, SchemaRegistry, migration};

fn row(field_name: &str, form_name: &str, validation: &str) -> DictionaryRow {
    DictionaryRow {
        field_name: field_name.to_string(),
        form_name: form_name.to_string(),
        field_type: "text".to_string(),
        text_validation_type_or_show_slider_number: validation.to_string(),
        ..DictionaryRow::default()
    }
}

fn study_registry() -> SchemaRegistry {
    SchemaRegistry::from_rows(vec![
        row("patient_id", "demographics", ""),
        row("birth_date", "demographics", "date_ymd"),
        row("weight", "vitals", "number_1dp"),
        row("pulse", "vitals", "integer"),
    ])
    .unwrap()
}

#[test]
fn fields_group_into_one_table_per_form() {
    let sql = migration::generate(&study_registry(), "form_name", None).unwrap();
    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS demographics();\n\
         ALTER TABLE demographics ADD COLUMN IF NOT EXISTS patient_id TEXT;\n\
         ALTER TABLE demographics ADD COLUMN IF NOT EXISTS birth_date DATE;\n\
         CREATE TABLE IF NOT EXISTS vitals();\n\
         ALTER TABLE vitals ADD COLUMN IF NOT EXISTS weight FLOAT;\n\
         ALTER TABLE vitals ADD COLUMN IF NOT EXISTS pulse INT;\n"
    );
}

#[test]
fn schema_prefix_is_applied_everywhere() {
    let sql = migration::generate(&study_registry(), "form_name", Some("study")).unwrap();
    assert!(sql.starts_with("CREATE SCHEMA IF NOT EXISTS study;\n"));
    assert!(sql.contains("CREATE TABLE IF NOT EXISTS study.vitals();"));
    assert!(sql.contains("ALTER TABLE study.vitals ADD COLUMN IF NOT EXISTS pulse INT;"));
}

#[test]
fn output_is_deterministic() {
    let registry = study_registry();
    let first = migration::generate(&registry, "form_name", None).unwrap();
    let second = migration::generate(&registry, "form_name", None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn grouping_by_any_dictionary_column_works() {
    let sql = migration::generate(&study_registry(), "field_type", None).unwrap();
    // All four fields share field_type "text", so one table holds them all.
    assert_eq!(sql.matches("CREATE TABLE").count(), 1);
    assert!(sql.contains("CREATE TABLE IF NOT EXISTS text();"));
}

#[test]
fn unknown_grouping_column_is_a_configuration_error() {
    let err = migration::generate(&study_registry(), "favorite_color", None).unwrap_err();
    assert!(matches!(err, DictionaryError::Configuration(_)));
}
