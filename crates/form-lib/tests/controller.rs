use form_lib::form_spec::{
    ErrorKind, FieldSpec, FormSchema, FormSpec, ValidationMode, ValidationPolicy, ValidationRule,
};
use form_lib::{FormController, FormError, FormEvent, SubmitOutcome};
use proptest::prelude::*;
use serde_json::{Value, json};

fn form_fields_spec() -> FormSpec {
    FormSpec::new("form-fields", "Form fields")
        .field(
            FieldSpec::new("name", ValidationRule::string().min_len(1).split(" "))
                .label("Name")
                .default_value("Name1 Name2"),
        )
        .field(
            FieldSpec::new("age", ValidationRule::string().min_len(1).coerce_number())
                .label("Age")
                .default_value("50"),
        )
        .field(
            FieldSpec::new("isActive", ValidationRule::boolean().map_bool("Yay", "Nay"))
                .label("is active")
                .default_value(true),
        )
}

fn controller() -> FormController {
    FormController::new(FormSchema::compile(form_fields_spec()).expect("schema compiles"))
}

fn controller_with_policy(
    mode: ValidationMode,
    revalidate_mode: ValidationMode,
) -> FormController {
    let spec = form_fields_spec().policy(ValidationPolicy {
        mode,
        revalidate_mode,
    });
    FormController::new(FormSchema::compile(spec).expect("schema compiles"))
}

#[test]
fn starts_from_default_values() {
    let form = controller();
    let state = form.state();
    assert_eq!(state.value("name"), Some(&json!("Name1 Name2")));
    assert_eq!(state.value("age"), Some(&json!("50")));
    assert_eq!(state.value("isActive"), Some(&json!(true)));
    assert!(state.errors().is_empty());
    assert!(state.result().is_none());
    assert_eq!(state.submit_count(), 0);
}

#[test]
fn submitting_defaults_calls_handler_once_with_output() {
    let mut form = controller();
    let mut calls = Vec::new();

    let outcome = form.handle_submit(|values| calls.push(values.to_json()));

    assert_eq!(outcome, SubmitOutcome::Submitted);
    assert_eq!(
        calls,
        vec![json!({ "name": ["Name1", "Name2"], "age": 50, "isActive": "Yay" })]
    );
    assert_eq!(
        form.state().result().map(|values| values.to_json()),
        Some(json!({ "name": ["Name1", "Name2"], "age": 50, "isActive": "Yay" }))
    );
}

#[test]
fn blocked_submit_keeps_previous_output_and_skips_handler() {
    let mut form = controller();
    assert!(form.submit().is_submitted());
    let previous = form.state().result().cloned();

    form.change("age", json!("abc")).expect("age is declared");
    let mut called = false;
    let outcome = form.handle_submit(|_| called = true);

    assert_eq!(outcome, SubmitOutcome::Blocked);
    assert!(!called);
    assert_eq!(form.state().result().cloned(), previous);
    let errors = form.state().errors();
    assert_eq!(errors.len(), 1);
    let error = errors.get("age").expect("age error");
    assert_eq!(error.kind, ErrorKind::Coercion);
    assert_eq!(error.message, "Expected number, received nan");
}

#[test]
fn empty_name_reports_only_name() {
    let mut form = controller();
    form.change("name", json!("")).expect("name is declared");

    assert_eq!(form.submit(), SubmitOutcome::Blocked);
    let errors = form.state().errors();
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(
        errors.get("name").map(|error| error.message.as_str()),
        Some("String must contain at least 1 character(s)")
    );
}

#[test]
fn on_submit_mode_defers_validation_until_first_submit() {
    let mut form = controller();
    form.change("name", json!("")).expect("name is declared");
    form.blur("name").expect("name is declared");
    assert!(form.state().errors().is_empty());

    form.submit();
    assert!(form.state().errors().contains("name"));

    form.change("name", json!("Ada")).expect("name is declared");
    assert!(form.state().errors().is_empty());

    form.change("name", json!("")).expect("name is declared");
    assert!(form.state().errors().contains("name"));
}

#[test]
fn revalidation_only_touches_the_changed_field() {
    let mut form = controller();
    form.change("name", json!("")).expect("name is declared");
    form.change("age", json!("abc")).expect("age is declared");
    form.submit();
    assert_eq!(form.state().errors().len(), 2);

    form.change("name", json!("Ada")).expect("name is declared");
    let errors = form.state().errors();
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["age"]);
}

#[test]
fn on_blur_mode_validates_on_blur_only() {
    let mut form = controller_with_policy(ValidationMode::OnBlur, ValidationMode::OnBlur);
    form.change("age", json!("x")).expect("age is declared");
    assert!(form.state().errors().is_empty());

    form.blur("age").expect("age is declared");
    assert!(form.state().errors().contains("age"));
    assert!(form.state().is_touched("age"));
}

#[test]
fn all_mode_validates_on_change_and_blur() {
    let mut form = controller_with_policy(ValidationMode::All, ValidationMode::All);
    form.change("name", json!("")).expect("name is declared");
    assert!(form.state().errors().contains("name"));
    form.change("name", json!("Grace")).expect("name is declared");
    form.blur("name").expect("name is declared");
    assert!(form.state().errors().is_empty());
}

#[test]
fn register_binds_to_declared_fields() {
    let mut form = controller();
    {
        let mut name = form.register("name").expect("name is declared");
        assert_eq!(name.name(), "name");
        assert_eq!(name.value(), Some(&json!("Name1 Name2")));
        name.change("Ada Lovelace");
        name.blur();
        assert!(name.is_touched());
        assert!(name.error().is_none());
        assert!(!name.is_disabled());
    }
    assert_eq!(form.state().value("name"), Some(&json!("Ada Lovelace")));

    let err = form.register("missing").err().expect("unknown field");
    assert!(matches!(err, FormError::UnknownField(name) if name == "missing"));
}

#[test]
fn handle_reports_error_after_failed_submit() {
    let mut form = controller();
    form.change("age", json!("")).expect("age is declared");
    form.submit();

    let age = form.register("age").expect("age is declared");
    assert_eq!(
        age.error().map(|error| error.message.as_str()),
        Some("String must contain at least 1 character(s)")
    );
}

#[test]
fn unknown_fields_are_rejected_by_handlers() {
    let mut form = controller();
    assert!(matches!(
        form.change("nope", json!(1)),
        Err(FormError::UnknownField(_))
    ));
    assert!(matches!(form.blur("nope"), Err(FormError::UnknownField(_))));
    assert!(!form.state().values().contains_key("nope"));
}

#[test]
fn disabled_overrides_shadow_the_global_flag() {
    let spec = FormSpec::new("flags", "Flags")
        .field(FieldSpec::new("plain", ValidationRule::string()))
        .field(FieldSpec::new("locked", ValidationRule::string()).disabled(true))
        .field(FieldSpec::new("open", ValidationRule::string()).disabled(false));
    let mut form = FormController::new(FormSchema::compile(spec).expect("schema compiles"));

    let map = form.disabled_map();
    assert_eq!(map.get("plain"), Some(&false));
    assert_eq!(map.get("locked"), Some(&true));
    assert_eq!(map.get("open"), Some(&false));

    form.set_disabled(true);
    let map = form.disabled_map();
    assert_eq!(map.get("plain"), Some(&true));
    assert_eq!(map.get("locked"), Some(&true));
    assert_eq!(map.get("open"), Some(&false));
    assert_eq!(form.is_field_disabled("plain"), Some(true));
    assert_eq!(form.is_field_disabled("missing"), None);

    let snapshot = form.snapshot();
    assert!(snapshot.disabled);
    assert_eq!(snapshot.field("open").map(|field| field.disabled), Some(false));
}

#[test]
fn disabled_fields_are_still_validated() {
    let mut form = controller();
    form.set_disabled(true);
    form.change("age", json!("abc")).expect("age is declared");
    assert_eq!(form.submit(), SubmitOutcome::Blocked);
    assert!(form.state().errors().contains("age"));
}

#[test]
fn reset_restores_defaults_and_clears_state() {
    let mut form = controller();
    form.submit();
    form.change("name", json!("")).expect("name is declared");
    form.blur("name").expect("name is declared");
    form.submit();
    assert!(!form.state().errors().is_empty());

    form.reset();

    let state = form.state();
    assert_eq!(state.value("name"), Some(&json!("Name1 Name2")));
    assert!(state.errors().is_empty());
    assert!(state.result().is_none());
    assert!(!state.is_touched("name"));
    assert_eq!(state.submit_count(), 0);
}

#[test]
fn initial_values_override_defaults_and_become_reset_target() {
    let schema = FormSchema::compile(form_fields_spec()).expect("schema compiles");
    let mut form =
        FormController::with_values(schema, &json!({ "age": "12" })).expect("values accepted");
    assert_eq!(form.state().value("age"), Some(&json!("12")));
    assert_eq!(form.state().value("name"), Some(&json!("Name1 Name2")));

    form.change("age", json!("99")).expect("age is declared");
    form.reset();
    assert_eq!(form.state().value("age"), Some(&json!("12")));
}

#[test]
fn initial_values_must_be_a_known_object() {
    let schema = FormSchema::compile(form_fields_spec()).expect("schema compiles");
    assert!(matches!(
        FormController::with_values(schema.clone(), &json!(["age"])),
        Err(FormError::InvalidValues(_))
    ));
    assert!(matches!(
        FormController::with_values(schema, &json!({ "extra": 1 })),
        Err(FormError::UnknownField(name)) if name == "extra"
    ));
}

#[test]
fn dispatch_applies_serialized_events() {
    let mut form = controller();
    let events: Vec<FormEvent> = serde_json::from_value(json!([
        { "type": "change", "field": "name", "value": "Solo" },
        { "type": "change", "field": "isActive", "value": false },
        { "type": "blur", "field": "name" },
        { "type": "set_disabled", "disabled": true },
        { "type": "submit" }
    ]))
    .expect("events deserialize");

    for event in events {
        form.dispatch(event).expect("event applies");
    }

    assert!(form.state().is_disabled());
    assert_eq!(
        form.state().result().map(|values| values.to_json()),
        Some(json!({ "name": ["Solo"], "age": 50, "isActive": "Nay" }))
    );

    form.dispatch(FormEvent::Reset).expect("reset applies");
    assert!(form.state().result().is_none());
    assert!(matches!(
        form.dispatch(FormEvent::Blur {
            field: "ghost".into()
        }),
        Err(FormError::UnknownField(_))
    ));
}

#[test]
fn snapshot_tracks_dirty_touched_and_errors() {
    let mut form = controller();
    let clean = form.snapshot();
    assert_eq!(clean.form_id, "form-fields");
    assert!(!clean.dirty);
    assert!(!clean.has_errors);
    assert_eq!(
        clean.fields.iter().map(|field| field.name.as_str()).collect::<Vec<_>>(),
        vec!["name", "age", "isActive"]
    );

    form.change("age", json!("x")).expect("age is declared");
    form.blur("age").expect("age is declared");
    form.submit();

    let snapshot = form.snapshot();
    assert!(snapshot.dirty);
    assert!(snapshot.has_errors);
    assert_eq!(snapshot.submit_count, 1);
    let age = snapshot.field("age").expect("age snapshot");
    assert!(age.dirty);
    assert!(age.touched);
    assert_eq!(age.label.as_deref(), Some("Age"));
    assert!(age.error.is_some());
    let name = snapshot.field("name").expect("name snapshot");
    assert!(!name.dirty);
    assert!(name.error.is_none());

    let json = serde_json::to_value(&snapshot).expect("snapshot serializes");
    assert_eq!(json["form_id"], json!("form-fields"));
    assert!(json.get("result").is_none());
}

proptest! {
    #[test]
    fn handler_runs_at_most_once_per_submit(
        name in ".{0,12}",
        age in "[0-9a-z]{0,4}",
        active: bool,
    ) {
        let mut form = controller();
        form.change("name", Value::String(name)).expect("name is declared");
        form.change("age", Value::String(age)).expect("age is declared");
        form.change("isActive", Value::Bool(active)).expect("isActive is declared");

        let mut calls = 0;
        let outcome = form.handle_submit(|_| calls += 1);
        prop_assert_eq!(calls, usize::from(outcome.is_submitted()));
        prop_assert_eq!(outcome.is_submitted(), form.state().errors().is_empty());
    }

    #[test]
    fn repeated_submits_agree(name in "[A-Za-z ]{1,12}", age in "[0-9]{1,3}") {
        let mut form = controller();
        form.change("name", Value::String(name)).expect("name is declared");
        form.change("age", Value::String(age)).expect("age is declared");

        let first = form.submit();
        let first_result = form.state().result().cloned();
        let second = form.submit();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first_result, form.state().result().cloned());
    }
}
