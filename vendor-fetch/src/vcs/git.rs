//! Git working copies, driven in-process through `libgit2`.

use std::path::{Path, PathBuf};

use git2::{BranchType, ObjectType, Oid};

use super::{Repository, Scratch, Vcs, VcsError, VcsKind, WorkingCopy};
use crate::error::Error;

/// Credential callbacks are retried by libgit2 until they fail; stop after this many attempts.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// The git backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git;

impl Vcs for Git {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    fn clone_repository(&self, repository: &Repository) -> Result<Box<dyn WorkingCopy>, Error> {
        let scratch = Scratch::new(VcsKind::Git)
            .map_err(|err| Error::clone_failed(&repository.url, err))?;
        let repo = clone_into(&repository.url, scratch.checkout())
            .map_err(|err| Error::clone_failed(&repository.url, err))?;
        Ok(Box::new(GitWorkingCopy {
            dir: scratch.checkout().to_path_buf(),
            repo: Some(repo),
            scratch,
        }))
    }
}

/// A git clone living in a temporary directory.
pub struct GitWorkingCopy {
    dir: PathBuf,
    repo: Option<git2::Repository>,
    scratch: Scratch,
}

impl GitWorkingCopy {
    fn repo(&self) -> Result<&git2::Repository, VcsError> {
        self.repo
            .as_ref()
            .ok_or_else(|| VcsError::Unsupported("the working copy was destroyed".to_string()))
    }
}

impl WorkingCopy for GitWorkingCopy {
    fn dir(&self) -> &Path {
        &self.dir
    }

    fn checkout_branch(&mut self, branch: &str) -> Result<(), Error> {
        let target = format!("branch '{branch}'");
        let repo = self.repo().map_err(|err| Error::checkout(target.clone(), err))?;
        repo.checkout_branch(branch)
            .map_err(|err| Error::checkout(target, err))
    }

    fn checkout_revision(&mut self, revision: &str) -> Result<(), Error> {
        if revision.is_empty() {
            // A fresh clone already sits on the default branch tip.
            return Ok(());
        }
        let target = format!("revision '{revision}'");
        let repo = self.repo().map_err(|err| Error::checkout(target.clone(), err))?;
        repo.checkout_commit(revision)
            .map_err(|err| Error::checkout(target, err))
    }

    fn revision(&self) -> Result<String, Error> {
        let repo = self.repo().map_err(|err| Error::inspect("revision", err))?;
        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|err| Error::inspect("revision", err))?;
        Ok(commit.id().to_string())
    }

    fn branch(&self) -> Result<String, Error> {
        let repo = self.repo().map_err(|err| Error::inspect("branch", err))?;
        repo.current_branch()
            .map_err(|err| Error::inspect("branch", err))
    }

    fn destroy(&mut self) -> Result<(), Error> {
        // Close the repository before its files go away.
        self.repo.take();
        self.scratch.remove()
    }
}

trait RepositoryExt {
    fn find_object_from_commit_sha(
        &self,
        commit_sha: &str,
    ) -> Result<git2::Object<'_>, git2::Error>;
    fn checkout_commit(&self, sha: &str) -> Result<(), git2::Error>;
    fn checkout_branch(&self, name: &str) -> Result<(), git2::Error>;
    fn current_branch(&self) -> Result<String, VcsError>;
    fn default_branch(&self) -> Option<String>;
}

impl RepositoryExt for git2::Repository {
    fn find_object_from_commit_sha(&self, sha: &str) -> Result<git2::Object<'_>, git2::Error> {
        if sha.len() < 40 {
            self.revparse_single(sha)
        } else {
            self.find_object(Oid::from_str(sha)?, None)
        }
    }

    fn checkout_commit(&self, sha: &str) -> Result<(), git2::Error> {
        let commit = self.find_object_from_commit_sha(sha)?.peel(ObjectType::Commit)?;
        let mut checkout_builder = git2::build::CheckoutBuilder::new();
        checkout_builder.force();
        self.checkout_tree(&commit, Some(&mut checkout_builder))?;
        self.set_head_detached(commit.id())
    }

    fn checkout_branch(&self, name: &str) -> Result<(), git2::Error> {
        let branch = match self.find_branch(name, BranchType::Local) {
            Ok(branch) => branch,
            Err(_) => {
                let upstream = format!("origin/{name}");
                let remote = self.find_branch(&upstream, BranchType::Remote)?;
                let commit = remote.get().peel_to_commit()?;
                let mut local = self.branch(name, &commit, false)?;
                local.set_upstream(Some(upstream.as_str()))?;
                local
            }
        };
        let refname = branch
            .get()
            .name()
            .ok_or_else(|| git2::Error::from_str("branch name is not valid utf-8"))?
            .to_string();
        let commit = branch.get().peel(ObjectType::Commit)?;
        let mut checkout_builder = git2::build::CheckoutBuilder::new();
        checkout_builder.force();
        self.checkout_tree(&commit, Some(&mut checkout_builder))?;
        self.set_head(&refname)
    }

    fn current_branch(&self) -> Result<String, VcsError> {
        let head = self.head()?;
        if head.is_branch() {
            return head
                .shorthand()
                .map(String::from)
                .ok_or_else(|| VcsError::Unsupported("branch name is not valid utf-8".to_string()));
        }
        // Detached: report a branch whose history includes the commit.
        let commit = head.peel_to_commit()?.id();
        let mut containing = Vec::new();
        for item in self.branches(None)? {
            let (branch, kind) = item?;
            let (Some(name), Some(tip)) = (branch.name()?, branch.get().target()) else {
                continue;
            };
            let name = match kind {
                BranchType::Local => name.to_string(),
                BranchType::Remote => match name.split_once('/') {
                    Some((_, "HEAD")) | None => continue,
                    Some((_, short)) => short.to_string(),
                },
            };
            if tip == commit || self.graph_descendant_of(tip, commit)? {
                containing.push(name);
            }
        }
        containing.sort();
        containing.dedup();
        if let Some(default) = self.default_branch()
            && containing.contains(&default)
        {
            return Ok(default);
        }
        containing.into_iter().next().ok_or_else(|| {
            VcsError::Unsupported(format!("revision {commit} is not contained in any branch"))
        })
    }

    fn default_branch(&self) -> Option<String> {
        if let Ok(reference) = self.find_reference("refs/remotes/origin/HEAD")
            && let Some(target) = reference.symbolic_target()
        {
            return target
                .strip_prefix("refs/remotes/origin/")
                .map(String::from);
        }
        // A clone creates exactly one local branch: the upstream default.
        self.branches(Some(BranchType::Local))
            .ok()?
            .filter_map(Result::ok)
            .find_map(|(branch, _)| branch.name().ok().flatten().map(String::from))
    }
}

fn clone_into(url: &str, into: &Path) -> Result<git2::Repository, git2::Error> {
    let mut attempts = 0;
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }
        prepare_git_credentials(url, username, allowed)
    });
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_options);
    tracing::debug!(%url, into = %into.display(), "cloning git repository");
    builder.clone(url, into)
}

fn prepare_git_credentials(
    url: &str,
    username_from_url: Option<&str>,
    credential_type: git2::CredentialType,
) -> Result<git2::Cred, git2::Error> {
    if credential_type.contains(git2::CredentialType::SSH_KEY) {
        let user = username_from_url.unwrap_or("git");
        match std::env::var_os("GIT_IDENTITY_FILE") {
            Some(identity_file) => {
                git2::Cred::ssh_key(user, None, Path::new(&identity_file), None)
            }
            None => git2::Cred::ssh_key_from_agent(user),
        }
    } else if credential_type.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
        let config = git2::Config::open_default()?;
        git2::Cred::credential_helper(&config, url, username_from_url)
    } else if credential_type.contains(git2::CredentialType::DEFAULT) {
        git2::Cred::default()
    } else {
        Err(git2::Error::from_str(
            "unsupported credential type, expected ssh or plaintext",
        ))
    }
}
