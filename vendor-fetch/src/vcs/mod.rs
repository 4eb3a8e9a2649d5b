//! Version control backends behind a single working-copy contract.
//!
//! A [`Vcs`] clones a [`Repository`] into a private temporary directory and hands back a
//! [`WorkingCopy`]. The working copy moves to a branch or revision, reports what it ended up on,
//! and removes itself when destroyed or dropped.

use std::path::{Path, PathBuf};

use crate::error::Error;

mod bzr;
mod git;
mod hg;
mod process;
mod svn;

pub use bzr::Bazaar;
pub use git::Git;
pub use hg::Mercurial;
pub use svn::Subversion;

/// Errors reported by a version control backend.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error(transparent)]
    Git(#[from] git2::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("command '{command}' exited with status {status}")]
    Subprocess {
        command: String,
        status: std::process::ExitStatus,
        #[source]
        stderr: anyhow::Error,
    },
    #[error("{0}")]
    Unsupported(String),
}

impl VcsError {
    pub(crate) fn subprocess(
        command: String,
        status: std::process::ExitStatus,
        stderr: anyhow::Error,
    ) -> Self {
        Self::Subprocess {
            command,
            status,
            stderr,
        }
    }
}

/// The version control systems a repository can be hosted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Git,
    Mercurial,
    Bazaar,
    Subversion,
}

impl VcsKind {
    /// Map a repository suffix such as `git` or `hg` onto its kind.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "git" => Some(Self::Git),
            "hg" => Some(Self::Mercurial),
            "bzr" => Some(Self::Bazaar),
            "svn" => Some(Self::Subversion),
            _ => None,
        }
    }

    /// The backend that handles this kind of repository.
    pub fn driver(self) -> Box<dyn Vcs> {
        match self {
            Self::Git => Box::new(Git),
            Self::Mercurial => Box::new(Mercurial),
            Self::Bazaar => Box::new(Bazaar),
            Self::Subversion => Box::new(Subversion),
        }
    }
}

impl std::fmt::Display for VcsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Mercurial => write!(f, "hg"),
            Self::Bazaar => write!(f, "bzr"),
            Self::Subversion => write!(f, "svn"),
        }
    }
}

/// The canonical upstream location of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub url: String,
    pub kind: VcsKind,
}

impl Repository {
    pub fn new<S: Into<String>>(url: S, kind: VcsKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.url, self.kind)
    }
}

/// A version control backend able to clone repositories of one kind.
pub trait Vcs {
    fn kind(&self) -> VcsKind;

    /// Clone `repository` into a fresh temporary directory.
    fn clone_repository(&self, repository: &Repository) -> Result<Box<dyn WorkingCopy>, Error>;
}

/// A live, temporary checkout of a repository.
///
/// After a clone the working copy sits on the tip of the repository's default branch.
/// [`revision`](WorkingCopy::revision) and [`branch`](WorkingCopy::branch) always report concrete
/// identifiers, never the symbolic names a caller passed in.
pub trait WorkingCopy {
    /// Root of the checkout.
    fn dir(&self) -> &Path;

    /// Move the checkout to the tip of `branch`.
    fn checkout_branch(&mut self, branch: &str) -> Result<(), Error>;

    /// Move the checkout to `revision`. An empty revision leaves the checkout on the tip of the
    /// currently checked out branch.
    fn checkout_revision(&mut self, revision: &str) -> Result<(), Error>;

    /// The full identifier of the checked out revision.
    fn revision(&self) -> Result<String, Error>;

    /// The branch the checkout is on, or one that contains the checked out revision.
    fn branch(&self) -> Result<String, Error>;

    /// Remove the checkout from disk. Calling this more than once is not an error.
    fn destroy(&mut self) -> Result<(), Error>;
}

/// A temporary directory holding one checkout, removed on [`Scratch::remove`] or drop.
#[derive(Debug)]
pub(crate) struct Scratch {
    root: Option<tempfile::TempDir>,
    checkout: PathBuf,
}

impl Scratch {
    pub(crate) fn new(kind: VcsKind) -> std::io::Result<Self> {
        let root = tempfile::Builder::new()
            .prefix(&format!("vendor-fetch-{kind}-"))
            .tempdir()?;
        let checkout = root.path().join("checkout");
        Ok(Self {
            root: Some(root),
            checkout,
        })
    }

    pub(crate) fn checkout(&self) -> &Path {
        &self.checkout
    }

    pub(crate) fn remove(&mut self) -> Result<(), Error> {
        match self.root.take() {
            Some(root) => {
                let path = root.path().to_path_buf();
                tracing::debug!(dir = %path.display(), "removing working copy");
                root.close().map_err(|err| Error::cleanup(&path, err))
            }
            None => Ok(()),
        }
    }
}
