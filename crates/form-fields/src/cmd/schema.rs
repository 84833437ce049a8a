use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use form_spec::{FormSpec, example_values, input_schema, output_schema};

use super::{load_schema, write_json};

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(long, value_name = "spec.json", required_unless_present = "format")]
    pub spec: Option<PathBuf>,
    /// Describe the transformed output instead of the raw input
    #[arg(long, conflicts_with = "example")]
    pub output: bool,
    /// Print example raw values; pattern fields without a default are left out
    #[arg(long)]
    pub example: bool,
    /// Print the JSON Schema of form spec files
    #[arg(long, conflicts_with_all = ["spec", "output", "example"])]
    pub format: bool,
}

pub fn run(args: &SchemaArgs, out: &mut impl Write) -> Result<()> {
    if args.format {
        return write_json(out, &schemars::schema_for!(FormSpec));
    }

    let path = args.spec.as_deref().context("--spec is required")?;
    let schema = load_schema(path)?;
    let document = if args.example {
        example_values(&schema)
    } else if args.output {
        output_schema(&schema)
    } else {
        input_schema(&schema)
    };
    write_json(out, &document)
}
