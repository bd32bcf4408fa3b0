//! ob - OpenBook command-line entry point

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use openbook::cli::{self, Cli};
use openbook::ui::output::{self, Verbosity};

/// Initialize logging to stderr.
///
/// `OPENBOOK_LOG` takes `EnvFilter` directives; otherwise the level
/// follows `--quiet` / `--debug`.
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_env("OPENBOOK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity == Verbosity::Debug),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(Verbosity::from_flags(cli.quiet, cli.debug));

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
