mod backend;
mod batch;
mod cli;
mod exit_codes;
mod observability;
mod output;
mod run;
mod run_error;

use clap::Parser;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(v) => v,
        Err(err) => {
            use clap::error::ErrorKind;
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    exit_codes::ExitCode::Success.as_i32()
                }
                _ => exit_codes::ExitCode::InvalidInput.as_i32(),
            };
            std::process::exit(code);
        }
    };

    observability::initialize_tracing();

    let res = match cli.command {
        cli::Command::Run(args) => run::run(args),
        cli::Command::Batch(args) => batch::run(args),
    };

    let code = match res {
        Ok(()) => exit_codes::ExitCode::Success.as_i32(),
        Err(err) => {
            eprintln!("{err}");
            err.exit_code().as_i32()
        }
    };

    std::process::exit(code);
}
