use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use form_lib::FormController;
use tracing::debug;

use super::{Outcome, load_schema, read_json, submit_and_report};

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    #[arg(long, value_name = "spec.json")]
    pub spec: PathBuf,
    /// Raw values to submit; the form defaults are used when omitted
    #[arg(long, value_name = "values.json")]
    pub values: Option<PathBuf>,
}

pub fn run(args: &SubmitArgs, out: &mut impl Write) -> Result<Outcome> {
    let mut form = FormController::new(load_schema(&args.spec)?);

    if let Some(path) = &args.values {
        let values = read_json(path)?;
        let values = values
            .as_object()
            .with_context(|| format!("{} must contain a JSON object", path.display()))?;
        for (name, value) in values {
            if form.schema().contains(name) {
                form.change(name, value.clone())?;
            } else {
                debug!(field = %name, "ignoring undeclared value");
            }
        }
    }

    submit_and_report(&mut form, out)
}
