mod cli;
mod run;
mod source;

use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::parse();
    run::initialise_tracing();

    match run::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
