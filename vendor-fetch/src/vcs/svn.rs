//! Subversion working copies, driven through the `svn` executable.

use std::ffi::OsStr;
use std::path::Path;

use super::process::{command, run};
use super::{Repository, Scratch, Vcs, VcsError, VcsKind, WorkingCopy};
use crate::error::Error;

/// The subversion backend. Subversion branches are directories, so only revisions can be checked
/// out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Subversion;

impl Vcs for Subversion {
    fn kind(&self) -> VcsKind {
        VcsKind::Subversion
    }

    fn clone_repository(&self, repository: &Repository) -> Result<Box<dyn WorkingCopy>, Error> {
        let scratch = Scratch::new(VcsKind::Subversion)
            .map_err(|err| Error::clone_failed(&repository.url, err))?;
        let args: [&OsStr; 4] = [
            "checkout".as_ref(),
            "--non-interactive".as_ref(),
            repository.url.as_ref(),
            scratch.checkout().as_os_str(),
        ];
        run(command("svn", args, None)).map_err(|err| Error::clone_failed(&repository.url, err))?;
        Ok(Box::new(SvnWorkingCopy { scratch }))
    }
}

/// An `svn checkout` living in a temporary directory.
#[derive(Debug)]
pub struct SvnWorkingCopy {
    scratch: Scratch,
}

impl SvnWorkingCopy {
    fn info(&self, item: &str) -> Result<String, VcsError> {
        run(command("svn", ["info", "--show-item", item], Some(self.dir())))
    }
}

impl WorkingCopy for SvnWorkingCopy {
    fn dir(&self) -> &Path {
        self.scratch.checkout()
    }

    fn checkout_branch(&mut self, branch: &str) -> Result<(), Error> {
        Err(Error::checkout(
            format!("branch '{branch}'"),
            VcsError::Unsupported("svn branches are addressed by import path".to_string()),
        ))
    }

    fn checkout_revision(&mut self, revision: &str) -> Result<(), Error> {
        if revision.is_empty() {
            return Ok(());
        }
        let args = ["update", "--non-interactive", "-r", revision];
        run(command("svn", args, Some(self.dir())))
            .map(|_| ())
            .map_err(|err| Error::checkout(format!("revision '{revision}'"), err))
    }

    fn revision(&self) -> Result<String, Error> {
        let output = self
            .info("revision")
            .map_err(|err| Error::inspect("revision", err))?;
        parse_revision(&output).ok_or_else(|| {
            Error::inspect(
                "revision",
                VcsError::Unsupported(format!("unexpected svn revision '{output}'")),
            )
        })
    }

    fn branch(&self) -> Result<String, Error> {
        let output = self
            .info("relative-url")
            .map_err(|err| Error::inspect("branch", err))?;
        parse_relative_url(&output).ok_or_else(|| {
            Error::inspect(
                "branch",
                VcsError::Unsupported(format!("unexpected svn relative url '{output}'")),
            )
        })
    }

    fn destroy(&mut self) -> Result<(), Error> {
        self.scratch.remove()
    }
}

fn parse_revision(output: &str) -> Option<String> {
    let revision = output.trim();
    (!revision.is_empty() && revision.chars().all(|c| c.is_ascii_digit()))
        .then(|| revision.to_string())
}

/// The branch of an svn checkout is its repository-relative URL, e.g. `^/trunk`,
/// `^/branches/name`, or `^/` for a checkout of the repository root.
fn parse_relative_url(output: &str) -> Option<String> {
    let relative = output.trim();
    match relative.strip_prefix("^/")? {
        "" => Some("^/".to_string()),
        path => Some(format!("^/{}", path.trim_end_matches('/'))),
    }
}
