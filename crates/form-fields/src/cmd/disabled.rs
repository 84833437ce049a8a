use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use form_spec::resolve_disabled;

use super::{load_schema, write_json};

#[derive(Args, Debug, Clone)]
pub struct DisabledArgs {
    #[arg(long, value_name = "spec.json")]
    pub spec: PathBuf,
    /// Form-wide disabled flag that fields without an override inherit
    #[arg(long)]
    pub global: bool,
}

pub fn run(args: &DisabledArgs, out: &mut impl Write) -> Result<()> {
    let schema = load_schema(&args.spec)?;
    write_json(out, &resolve_disabled(&schema, args.global))
}
