use std::process::ExitCode;

use tracing_subscriber::prelude::*;

use crate::args::ValidatedCommand;
use crate::error::AppError;

mod args;
mod error;
mod fetch;
mod list;
mod progress;

/// Log to stderr so stdout only carries command output. `RUST_LOG` overrides the default level.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report(error: AppError) -> ExitCode {
    let code = error.exit_code();
    eprintln!("❌ {:#}", anyhow::Error::new(error));
    ExitCode::from(code)
}

fn run(args: args::ValidatedArgs) -> Result<(), AppError> {
    match args.command {
        ValidatedCommand::Fetch {
            import_path,
            options,
        } => fetch::fetch_one(args.project_dir, args.missing_manifest, import_path, &options),
        ValidatedCommand::List { format } => {
            list::list(&args.project_dir, args.missing_manifest, format)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = match args::parse() {
        Ok(args) => args,
        Err(error) => return report(error),
    };
    tracing::debug!(?args, "parsed arguments");
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(error),
    }
}
