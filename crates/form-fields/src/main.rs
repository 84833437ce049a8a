use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    form_fields::cli::main()
}
