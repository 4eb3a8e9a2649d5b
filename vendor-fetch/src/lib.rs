#![allow(rustdoc::redundant_explicit_links)]
//! Vendor third-party packages into a project and record exactly what was vendored.
//!
//! A package is named by its import path, e.g. `github.com/user/project/sub/pkg`. Fetching it
//! resolves the repository that hosts it, clones that repository into a temporary working copy,
//! checks out the requested branch or revision, copies the package into
//! `vendor/src/<import path>` and records the concrete revision and branch in the manifest at
//! `vendor/manifest`.
//!
//! # Core Features
//!
//! - Resolve import paths for GitHub, GitLab, Bitbucket and Launchpad, and for any host using the
//!   `<host>/<path>.<vcs>` convention.
//! - Clone git repositories in-process with [`git2`](https://crates.io/crates/git2); clone
//!   Mercurial, Bazaar and Subversion repositories with their command line tools.
//! - Record the resolved revision and branch, never the symbolic names that were asked for.
//! - Leave the manifest and the vendor tree untouched when a fetch fails.
//!
//! # Usage
//!
//! Fetch a package at the tip of its default branch:
//!
//! ```no_run
//! use vendor_fetch::{Fetcher, FetchOptions};
//!
//! let fetcher = Fetcher::new(".");
//! let dep = fetcher.fetch("github.com/user/project/sub", &FetchOptions::new())?;
//! assert_eq!(dep.path, "sub");
//! # Ok::<(), vendor_fetch::Error>(())
//! ```
//!
//! Inspect what has been vendored so far:
//!
//! ```no_run
//! use vendor_fetch::{Manifest, MissingManifest, manifest_path};
//!
//! let manifest = Manifest::load(manifest_path("."), MissingManifest::Empty)?;
//! for dep in &manifest {
//!     println!("{dep}");
//! }
//! # Ok::<(), vendor_fetch::Error>(())
//! ```
//!
//! Resolution alone never touches the network:
//!
//! ```rust
//! use vendor_fetch::{resolve, VcsKind};
//!
//! let (repo, sub) = resolve("launchpad.net/project/sub")?;
//! assert_eq!(repo.url, "https://launchpad.net/project");
//! assert_eq!(repo.kind, VcsKind::Bazaar);
//! assert_eq!(sub, "sub");
//! # Ok::<(), vendor_fetch::Error>(())
//! ```

mod copy;
mod error;
mod fetch;
mod manifest;
mod resolve;
pub mod vcs;

#[doc(inline)]
pub use crate::copy::{VCS_METADATA, copy_tree};
#[doc(inline)]
pub use crate::error::{Error, ErrorInner, ErrorKind};
#[doc(inline)]
pub use crate::fetch::{FetchOptions, Fetcher};
#[doc(inline)]
pub use crate::manifest::{
    Dependency, MANIFEST_VERSION, Manifest, ManifestLock, MissingManifest, manifest_path,
};
#[doc(inline)]
pub use crate::resolve::{HostingResolver, Resolve, resolve, to_relative_path};
#[doc(inline)]
pub use crate::vcs::{Repository, Vcs, VcsError, VcsKind, WorkingCopy};
