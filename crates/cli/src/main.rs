use std::process::ExitCode;

fn main() -> ExitCode {
    mmi_cli::run()
}
