use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use form_lib::FormController;
use form_spec::FormSchema;
use serde_json::Value;
use tracing::debug;

use super::{Outcome, submit_and_report};

/// Spec of the built-in demo: a name split into words, an age read as a number and an
/// "is active" checkbox mapped to `Yay`/`Nay`.
pub const FORM_FIELDS_SPEC: &str = include_str!("../../assets/form_fields.json");

pub fn form_fields_schema() -> Result<FormSchema> {
    FormSchema::from_json(FORM_FIELDS_SPEC).context("built-in form fields spec is invalid")
}

#[derive(Args, Debug, Clone, Default)]
pub struct DemoArgs {
    /// Raw text typed into the name field
    #[arg(long, value_name = "TEXT")]
    pub name: Option<String>,
    /// Raw text typed into the age field
    #[arg(long, value_name = "TEXT")]
    pub age: Option<String>,
    /// Leave the "is active" checkbox unticked
    #[arg(long)]
    pub inactive: bool,
    /// Disable every field without an explicit override
    #[arg(long)]
    pub disabled: bool,
}

pub fn run(args: &DemoArgs, out: &mut impl Write) -> Result<Outcome> {
    let mut form = FormController::new(form_fields_schema()?);
    form.set_disabled(args.disabled);

    if let Some(name) = &args.name {
        form.change("name", Value::from(name.as_str()))?;
    }
    if let Some(age) = &args.age {
        form.change("age", Value::from(age.as_str()))?;
    }
    if args.inactive {
        form.change("isActive", Value::Bool(false))?;
    }

    for (field, disabled) in form.disabled_map() {
        debug!(%field, disabled, "demo field");
    }

    submit_and_report(&mut form, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_demo(args: DemoArgs) -> (Outcome, String) {
        let mut out = Vec::new();
        let code = run(&args, &mut out).expect("demo runs");
        (code, String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn built_in_spec_compiles() {
        let schema = form_fields_schema().expect("compiles");
        assert_eq!(
            schema.fields().map(|field| field.name.as_str()).collect::<Vec<_>>(),
            vec!["name", "age", "isActive"]
        );
    }

    #[test]
    fn defaults_submit_with_four_space_indent() {
        let (code, output) = run_demo(DemoArgs::default());
        assert_eq!(code, Outcome::Valid);
        assert_eq!(
            output,
            "{\n    \"name\": [\n        \"Name1\",\n        \"Name2\"\n    ],\n    \"age\": 50,\n    \"isActive\": \"Yay\"\n}\n"
        );
    }

    #[test]
    fn bad_age_reports_error_map() {
        let (code, output) = run_demo(DemoArgs {
            name: Some("A B".into()),
            age: Some("abc".into()),
            inactive: true,
            disabled: false,
        });
        assert_eq!(code, Outcome::Invalid);
        let errors: Value = serde_json::from_str(&output).expect("json output");
        assert_eq!(
            errors,
            serde_json::json!({ "age": "Expected number, received nan" })
        );
    }

    #[test]
    fn disabled_form_still_submits() {
        let (code, output) = run_demo(DemoArgs {
            disabled: true,
            inactive: true,
            ..DemoArgs::default()
        });
        assert_eq!(code, Outcome::Valid);
        assert!(output.contains("\"Nay\""));
    }
}
