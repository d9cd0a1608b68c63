use redcap_schema::logic::{from_eval_syntax, to_eval_syntax};
use redcap_schema::schema::DictionaryRow;
use redcap_schema::{SchemaRegistry, TriState, ValueSnapshot, compile, evaluate, render};

fn survey_registry() -> SchemaRegistry {
    let rows = vec![
        DictionaryRow {
            field_name: "age".to_string(),
            form_name: "survey".to_string(),
            field_type: "text".to_string(),
            text_validation_type_or_show_slider_number: "integer".to_string(),
            ..DictionaryRow::default()
        },
        DictionaryRow {
            field_name: "consent".to_string(),
            form_name: "survey".to_string(),
            field_type: "checkbox".to_string(),
            select_choices_or_calculations: "1, Yes | 2, Maybe".to_string(),
            ..DictionaryRow::default()
        },
        DictionaryRow {
            field_name: "name".to_string(),
            form_name: "survey".to_string(),
            field_type: "text".to_string(),
            ..DictionaryRow::default()
        },
    ];
    SchemaRegistry::from_rows(rows).unwrap()
}

#[test]
fn predicate_over_missing_fields_is_unknown() {
    let registry = survey_registry();
    let expr = compile("[age] > 18 and [consent(1)] = 1", &registry).unwrap();

    let empty = ValueSnapshot::new();
    assert_eq!(evaluate(&expr, &empty), TriState::Unknown);

    // One conjunct false is enough to hide, even with the other unknown.
    let minor = ValueSnapshot::new().set("age", "10");
    assert_eq!(evaluate(&expr, &minor), TriState::Hidden);

    let adult = ValueSnapshot::new()
        .set("age", "30")
        .set("consent___1", "1");
    assert_eq!(evaluate(&expr, &adult), TriState::Shown);

    let refused = ValueSnapshot::new()
        .set("age", "30")
        .set("consent___1", "0");
    assert_eq!(evaluate(&expr, &refused), TriState::Hidden);
}

#[test]
fn or_is_shown_when_either_side_is() {
    let registry = survey_registry();
    let expr = compile("[age] < 18 or [consent(2)] = 1", &registry).unwrap();
    let young = ValueSnapshot::new().set("age", "12");
    assert_eq!(evaluate(&expr, &young), TriState::Shown);
    // Neither side decided.
    assert_eq!(evaluate(&expr, &ValueSnapshot::new()), TriState::Unknown);
}

#[test]
fn unknown_field_reference_fails_at_compile_time() {
    let registry = survey_registry();
    let err = compile("[heigth] > 100", &registry).unwrap_err();
    assert!(err.to_string().contains("heigth"));
    // Undeclared checkbox choices are compile errors too.
    assert!(compile("[consent(9)] = 1", &registry).is_err());
}

#[test]
fn malformed_logic_reports_position() {
    let registry = survey_registry();
    assert!(compile("[age] >", &registry).is_err());
    assert!(compile("[age] > 18 and", &registry).is_err());
    assert!(compile("[age] ? 18", &registry).is_err());
    assert!(compile("[age] > 18 19", &registry).is_err());
}

#[test]
fn blank_logic_is_always_shown() {
    let registry = survey_registry();
    let expr = compile("   ", &registry).unwrap();
    assert_eq!(evaluate(&expr, &ValueSnapshot::new()), TriState::Shown);
    assert_eq!(render(&expr), "");
}

#[test]
fn render_round_trips_semantically() {
    let registry = survey_registry();
    for raw in [
        "[age] > 18 and [consent(1)] = 1",
        "[age]>18 AND ([name] = 'Bo' OR [age] <> 21)",
        "[age] >= 18 or [age] <= 5 or [consent(2)] = '1'",
    ] {
        let expr = compile(raw, &registry).unwrap();
        let rendered = render(&expr);
        let reparsed = compile(&rendered, &registry).unwrap();
        assert_eq!(render(&reparsed), rendered, "unstable render for {raw:?}");
        for snapshot in [
            ValueSnapshot::new(),
            ValueSnapshot::new().set("age", "30").set("name", "Bo"),
            ValueSnapshot::new()
                .set("age", "3")
                .set("consent___1", "1")
                .set("consent___2", "0"),
        ] {
            assert_eq!(
                evaluate(&expr, &snapshot),
                evaluate(&reparsed, &snapshot),
                "render changed meaning of {raw:?}"
            );
        }
    }
}

#[test]
fn eval_syntax_rewrites_round_trip() {
    let raw = "[age] > 18 and [consent(1)] = 1";
    let rewritten = to_eval_syntax(raw);
    assert_eq!(rewritten, "record['age'] > 18 and record['consent___1'] == 1");
    assert_eq!(from_eval_syntax(&rewritten), "[age] > 18 and [consent(1)] = 1");

    let ne = to_eval_syntax("[age] <> 21");
    assert_eq!(ne, "record['age'] != 21");
    assert_eq!(from_eval_syntax(&ne), "[age] <> 21");
}
