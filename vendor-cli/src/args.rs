use std::path::PathBuf;

use clap::Parser;

use vendor_fetch::{FetchOptions, MissingManifest};

use crate::error::AppError;

// Shamelessly borrowed from https://github.com/crate-ci/clap-cargo/blob/0378657ffdf2b67bcd6f1ab56e04a1322b92dd0e/src/style.rs
// thanks to https://stackoverflow.com/a/79614957
use anstyle::AnsiColor::*;
use anstyle::Effects;
use anstyle::Style;

const HEADER: Style = Green.on_default().effects(Effects::BOLD);
const USAGE: Style = Green.on_default().effects(Effects::BOLD);
const LITERAL: Style = Cyan.on_default().effects(Effects::BOLD);
const PLACEHOLDER: Style = Cyan.on_default();
const ERROR: Style = Red.on_default().effects(Effects::BOLD);
const VALID: Style = Cyan.on_default().effects(Effects::BOLD);
const INVALID: Style = Yellow.on_default().effects(Effects::BOLD);

const APP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(HEADER)
    .usage(USAGE)
    .literal(LITERAL)
    .placeholder(PLACEHOLDER)
    .error(ERROR)
    .valid(VALID)
    .invalid(INVALID);

/// Environment variable naming the project root when `--project` is not given.
pub const PROJECT_DIR_ENV: &str = "VENDOR_PROJECT_DIR";

#[derive(Debug, Parser)]
#[command(name = "vendor")]
#[command(version)]
#[command(about = "Fetch packages into the vendor tree and record them in the manifest")]
#[command(long_about = None)]
#[command(styles = APP_STYLING)]
#[command(term_width = 80)]
struct Args {
    /// Project root. If omitted, check the `VENDOR_PROJECT_DIR` environment variable, then search
    /// the current and parent directories for `vendor/manifest`, then use the current directory.
    #[arg(long, short = 'p', value_name = "PATH", global = true)]
    project: Option<PathBuf>,

    /// Fail instead of starting from an empty manifest when `vendor/manifest` does not exist.
    #[arg(long, global = true)]
    require_manifest: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Fetch a package into vendor/src and record it in the manifest
    Fetch {
        /// Branch to fetch. Defaults to the repository's default branch.
        #[arg(long, short = 'b', value_name = "BRANCH")]
        branch: Option<String>,

        /// Revision to fetch. Defaults to the tip of the branch. Cannot be combined with --branch.
        #[arg(long, short = 'r', value_name = "REV")]
        revision: Option<String>,

        /// Import path of the package, e.g. github.com/user/project/sub
        #[arg(value_name = "IMPORTPATH")]
        import_path: String,
    },
    /// List the dependencies recorded in the manifest
    List {
        /// Output format
        #[arg(long, short = 'f', value_enum, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Output in JSON format
    Json,
    /// Output in TOML format
    Toml,
}

#[derive(Debug)]
pub struct ValidatedArgs {
    pub project_dir: PathBuf,
    pub missing_manifest: MissingManifest,
    pub command: ValidatedCommand,
}

#[derive(Debug)]
pub enum ValidatedCommand {
    Fetch {
        import_path: String,
        options: FetchOptions,
    },
    List {
        format: Option<OutputFormat>,
    },
}

impl ValidatedArgs {
    /// Detect the project root, falling back to `VENDOR_PROJECT_DIR`, then the nearest directory
    /// holding `vendor/manifest`, then the current directory.
    fn detect_project_dir(arg: Option<PathBuf>) -> Result<PathBuf, AppError> {
        let dir = match arg.or_else(|| std::env::var_os(PROJECT_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => {
                let start = std::env::current_dir()?;
                let mut current_dir = start.clone();
                loop {
                    if vendor_fetch::manifest_path(&current_dir).is_file() {
                        break current_dir;
                    }
                    if !current_dir.pop() {
                        break start;
                    }
                }
            }
        };
        if !dir.is_dir() {
            return Err(AppError::arg_validation(format!(
                "project directory does not exist: {}",
                dir.display()
            )));
        }
        Ok(dir)
    }
}

impl TryFrom<Command> for ValidatedCommand {
    type Error = AppError;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        match command {
            Command::Fetch {
                branch,
                revision,
                import_path,
            } => {
                let options = FetchOptions { branch, revision };
                options
                    .validate()
                    .map_err(|err| AppError::arg_validation(err.to_string()))?;
                Ok(ValidatedCommand::Fetch {
                    import_path,
                    options,
                })
            }
            Command::List { format } => Ok(ValidatedCommand::List { format }),
        }
    }
}

pub fn parse() -> Result<ValidatedArgs, AppError> {
    let args = Args::parse();
    let command = ValidatedCommand::try_from(args.command)?;
    let missing_manifest = if args.require_manifest {
        MissingManifest::Error
    } else {
        MissingManifest::Empty
    };
    Ok(ValidatedArgs {
        project_dir: ValidatedArgs::detect_project_dir(args.project)?,
        missing_manifest,
        command,
    })
}
