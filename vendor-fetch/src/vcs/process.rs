//! Running version control executables and capturing what they print.

use std::process::{Command, Stdio};

use super::VcsError;

/// Prepare `program` with its arguments, run from `dir` when given.
pub(crate) fn command<I, S>(program: &str, args: I, dir: Option<&std::path::Path>) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null());
    cmd
}

/// Run `cmd` to completion and return its trimmed standard output.
pub(crate) fn run(mut cmd: Command) -> Result<String, VcsError> {
    let command = describe(&cmd);
    tracing::debug!(%command, "running");
    let output = cmd.output()?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(VcsError::subprocess(
            command,
            output.status,
            anyhow::anyhow!(stderr),
        ))
    }
}

fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
