//! Bazaar working copies, driven through the `bzr` executable.

use std::ffi::OsStr;
use std::path::Path;

use super::process::{command, run};
use super::{Repository, Scratch, Vcs, VcsError, VcsKind, WorkingCopy};
use crate::error::Error;

/// The bazaar backend. Bazaar branches are separate URLs, so only revisions can be checked out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bazaar;

impl Vcs for Bazaar {
    fn kind(&self) -> VcsKind {
        VcsKind::Bazaar
    }

    fn clone_repository(&self, repository: &Repository) -> Result<Box<dyn WorkingCopy>, Error> {
        let scratch = Scratch::new(VcsKind::Bazaar)
            .map_err(|err| Error::clone_failed(&repository.url, err))?;
        let args: [&OsStr; 3] = [
            "branch".as_ref(),
            repository.url.as_ref(),
            scratch.checkout().as_os_str(),
        ];
        run(command("bzr", args, None)).map_err(|err| Error::clone_failed(&repository.url, err))?;
        Ok(Box::new(BzrWorkingCopy { scratch }))
    }
}

/// A `bzr branch` living in a temporary directory.
#[derive(Debug)]
pub struct BzrWorkingCopy {
    scratch: Scratch,
}

impl WorkingCopy for BzrWorkingCopy {
    fn dir(&self) -> &Path {
        self.scratch.checkout()
    }

    fn checkout_branch(&mut self, branch: &str) -> Result<(), Error> {
        Err(Error::checkout(
            format!("branch '{branch}'"),
            VcsError::Unsupported("bzr branches are addressed by import path".to_string()),
        ))
    }

    fn checkout_revision(&mut self, revision: &str) -> Result<(), Error> {
        if revision.is_empty() {
            return Ok(());
        }
        run(command("bzr", ["update", "-r", revision], Some(self.dir())))
            .map(|_| ())
            .map_err(|err| Error::checkout(format!("revision '{revision}'"), err))
    }

    fn revision(&self) -> Result<String, Error> {
        let info = run(command("bzr", ["revision-info", "--tree"], Some(self.dir())))
            .map_err(|err| Error::inspect("revision", err))?;
        parse_revision_info(&info).ok_or_else(|| {
            Error::inspect(
                "revision",
                VcsError::Unsupported(format!("unexpected revision-info output '{info}'")),
            )
        })
    }

    fn branch(&self) -> Result<String, Error> {
        run(command("bzr", ["nick"], Some(self.dir())))
            .map_err(|err| Error::inspect("branch", err))
    }

    fn destroy(&mut self) -> Result<(), Error> {
        self.scratch.remove()
    }
}

/// The revision id from `bzr revision-info`, which prints `<revno> <revision-id>`. The revno is
/// only meaningful within one branch, the id is stable.
fn parse_revision_info(output: &str) -> Option<String> {
    let mut fields = output.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(_revno), Some(id), None) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn working_copy() -> BzrWorkingCopy {
        BzrWorkingCopy {
            scratch: Scratch::new(VcsKind::Bazaar).unwrap(),
        }
    }

    #[test]
    fn revision_info_parsing() {
        assert_eq!(
            parse_revision_info("42 jane@example.com-20240101120000-abcdef0123456789\n").as_deref(),
            Some("jane@example.com-20240101120000-abcdef0123456789")
        );
        assert_eq!(parse_revision_info("42"), None);
        assert_eq!(parse_revision_info(""), None);
        assert_eq!(parse_revision_info("bzr: ERROR: Not a branch"), None);
    }

    #[test]
    fn named_branches_are_unsupported() {
        let mut wc = working_copy();
        let err = wc.checkout_branch("trunk").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Checkout);
        wc.checkout_revision("").unwrap();
        wc.destroy().unwrap();
        wc.destroy().unwrap();
    }
}
