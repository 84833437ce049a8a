pub mod demo;
pub mod disabled;
pub mod schema;
pub mod submit;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use form_lib::FormController;
use form_spec::FormSchema;
use serde::Serialize;
use serde_json::Value;

/// Verdict of a submitting command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Valid => ExitCode::SUCCESS,
            Outcome::Invalid => ExitCode::FAILURE,
        }
    }
}

pub(crate) fn load_schema(path: &Path) -> Result<FormSchema> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read form spec {}", path.display()))?;
    FormSchema::from_json(&raw).with_context(|| format!("invalid form spec {}", path.display()))
}

pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

pub(crate) fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Submits the form and prints either the transformed values (four-space JSON) or the
/// field error messages.
pub(crate) fn submit_and_report(
    form: &mut FormController,
    out: &mut impl Write,
) -> Result<Outcome> {
    let mut submitted = None;
    form.handle_submit(|values| submitted = Some(values.to_json_pretty()));

    match submitted {
        Some(pretty) => {
            writeln!(out, "{}", pretty?)?;
            Ok(Outcome::Valid)
        }
        None => {
            write_json(out, &form.state().errors().messages())?;
            Ok(Outcome::Invalid)
        }
    }
}
