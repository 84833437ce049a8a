use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::cmd::{
    self, demo::DemoArgs, disabled::DisabledArgs, schema::SchemaArgs, submit::SubmitArgs,
};
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "form-fields",
    about = "Validate and transform form input with declarative field rules",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit the built-in form fields demo
    Demo(DemoArgs),
    /// Submit a values file against a form spec
    Submit(SubmitArgs),
    /// Print the JSON Schema derived from a form spec
    Schema(SchemaArgs),
    /// Print the effective disabled state of every field
    Disabled(DisabledArgs),
}

pub fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Demo(args) => cmd::demo::run(&args, &mut out).map(ExitCode::from),
        Commands::Submit(args) => cmd::submit::run(&args, &mut out).map(ExitCode::from),
        Commands::Schema(args) => {
            cmd::schema::run(&args, &mut out)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Disabled(args) => {
            cmd::disabled::run(&args, &mut out)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn parses_demo_command() {
        let cli = Cli::try_parse_from([
            "form-fields",
            "demo",
            "--name",
            "Ada Lovelace",
            "--age",
            "36",
            "--inactive",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Demo(args) => {
                assert_eq!(args.name.as_deref(), Some("Ada Lovelace"));
                assert_eq!(args.age.as_deref(), Some("36"));
                assert!(args.inactive);
                assert!(!args.disabled);
            }
            _ => panic!("expected demo args"),
        }
    }

    #[test]
    fn parses_submit_command_with_global_verbosity() {
        let cli = Cli::try_parse_from([
            "form-fields",
            "submit",
            "--spec",
            "form.json",
            "--values",
            "values.json",
            "-vv",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Submit(args) => {
                assert_eq!(args.spec, Path::new("form.json"));
                assert_eq!(args.values.as_deref(), Some(Path::new("values.json")));
            }
            _ => panic!("expected submit args"),
        }
    }

    #[test]
    fn parses_schema_command() {
        let cli = Cli::try_parse_from(["form-fields", "schema", "--spec", "form.json", "--output"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Schema(args) => {
                assert_eq!(args.spec.as_deref(), Some(Path::new("form.json")));
                assert!(args.output);
                assert!(!args.example);
            }
            _ => panic!("expected schema args"),
        }
    }

    #[test]
    fn schema_requires_spec_unless_format_requested() {
        assert!(Cli::try_parse_from(["form-fields", "schema"]).is_err());
        assert!(Cli::try_parse_from(["form-fields", "schema", "--format"]).is_ok());
        assert!(
            Cli::try_parse_from([
                "form-fields",
                "schema",
                "--spec",
                "form.json",
                "--output",
                "--example"
            ])
            .is_err()
        );
    }

    #[test]
    fn parses_disabled_command() {
        let cli = Cli::try_parse_from(["form-fields", "disabled", "--spec", "f.json", "--global"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Disabled(args) => {
                assert_eq!(args.spec, Path::new("f.json"));
                assert!(args.global);
            }
            _ => panic!("expected disabled args"),
        }
    }
}
