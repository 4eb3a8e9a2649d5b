//! Mercurial working copies, driven through the `hg` executable.

use std::ffi::OsStr;
use std::path::Path;

use super::process::{command, run};
use super::{Repository, Scratch, Vcs, VcsError, VcsKind, WorkingCopy};
use crate::error::Error;

/// The mercurial backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mercurial;

impl Vcs for Mercurial {
    fn kind(&self) -> VcsKind {
        VcsKind::Mercurial
    }

    fn clone_repository(&self, repository: &Repository) -> Result<Box<dyn WorkingCopy>, Error> {
        let scratch = Scratch::new(VcsKind::Mercurial)
            .map_err(|err| Error::clone_failed(&repository.url, err))?;
        let args: [&OsStr; 3] = [
            "clone".as_ref(),
            repository.url.as_ref(),
            scratch.checkout().as_os_str(),
        ];
        run(command("hg", args, None)).map_err(|err| Error::clone_failed(&repository.url, err))?;
        Ok(Box::new(HgWorkingCopy { scratch }))
    }
}

/// An `hg clone` living in a temporary directory.
#[derive(Debug)]
pub struct HgWorkingCopy {
    scratch: Scratch,
}

impl HgWorkingCopy {
    fn update(&self, target: &str, description: String) -> Result<(), Error> {
        run(command("hg", ["update", "--clean", "--rev", target], Some(self.dir())))
            .map(|_| ())
            .map_err(|err| Error::checkout(description, err))
    }
}

impl WorkingCopy for HgWorkingCopy {
    fn dir(&self) -> &Path {
        self.scratch.checkout()
    }

    fn checkout_branch(&mut self, branch: &str) -> Result<(), Error> {
        self.update(branch, format!("branch '{branch}'"))
    }

    fn checkout_revision(&mut self, revision: &str) -> Result<(), Error> {
        if revision.is_empty() {
            return Ok(());
        }
        self.update(revision, format!("revision '{revision}'"))
    }

    fn revision(&self) -> Result<String, Error> {
        // `--debug` makes `hg id` print the full 40 character node id.
        let output = run(command("hg", ["id", "--id", "--debug"], Some(self.dir())))
            .map_err(|err| Error::inspect("revision", err))?;
        parse_node_id(&output).ok_or_else(|| {
            Error::inspect(
                "revision",
                VcsError::Unsupported(format!("unexpected hg id output '{output}'")),
            )
        })
    }

    fn branch(&self) -> Result<String, Error> {
        run(command("hg", ["branch"], Some(self.dir())))
            .map_err(|err| Error::inspect("branch", err))
    }

    fn destroy(&mut self) -> Result<(), Error> {
        self.scratch.remove()
    }
}

/// The node id from `hg id --id --debug`. A trailing `+` marks local changes and a merge prints
/// both parents joined by `+`; the first parent is the checked out revision.
fn parse_node_id(output: &str) -> Option<String> {
    output
        .trim()
        .split('+')
        .next()
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_hexdigit()))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE: &str = "9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f1a0b";

    #[test]
    fn node_id_parsing() {
        assert_eq!(parse_node_id(NODE).as_deref(), Some(NODE));
        assert_eq!(parse_node_id(&format!("{NODE}+\n")).as_deref(), Some(NODE));
        let merge = format!("{NODE}+0000000000000000000000000000000000000001+");
        assert_eq!(parse_node_id(&merge).as_deref(), Some(NODE));
        assert_eq!(parse_node_id(""), None);
        assert_eq!(parse_node_id("abort: no repository found"), None);
    }

    #[test]
    fn empty_revision_needs_no_hg() {
        let mut wc = HgWorkingCopy {
            scratch: Scratch::new(VcsKind::Mercurial).unwrap(),
        };
        wc.checkout_revision("").unwrap();
        let root = wc.dir().parent().unwrap().to_path_buf();
        wc.destroy().unwrap();
        assert!(!root.exists());
        wc.destroy().unwrap();
    }
}
