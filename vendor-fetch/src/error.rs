use std::path::{Path, PathBuf};

use crate::vcs::VcsError;

/// Categories of errors that can be matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Both a branch and a revision were requested.
    ConflictingFlags,
    /// The manifest could not be read or is malformed.
    ManifestRead,
    /// Another fetch holds the manifest lock.
    ManifestLocked,
    /// The import path does not map onto a known repository layout.
    Resolution,
    /// The repository could not be cloned.
    Fetch,
    /// The requested branch or revision does not exist, or the checkout could not be inspected.
    Checkout,
    /// The import path is already recorded in the manifest.
    DuplicateImportPath,
    /// Materialising the subtree in the vendor tree failed.
    Copy,
    /// The manifest could not be persisted.
    ManifestWrite,
    /// The working copy could not be removed.
    Cleanup,
}

/// Internal error type that contains all error variants.
#[derive(Debug, thiserror::Error)]
pub enum ErrorInner {
    #[error("cannot fetch branch '{branch}' and revision '{revision}' at the same time")]
    ConflictingFlags { branch: String, revision: String },

    #[error("could not read manifest {}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("could not parse manifest {}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        err: serde_json::Error,
    },

    #[error("invalid manifest {}: {reason}", path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("manifest is locked by another fetch (lock file {})", lock.display())]
    ManifestLocked { lock: PathBuf },

    #[error("could not write manifest {}", path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("could not serialise manifest")]
    ManifestSerialize(#[source] serde_json::Error),

    #[error("could not resolve import path '{import_path}': {reason}")]
    Resolution { import_path: String, reason: String },

    #[error("could not clone {url}")]
    Clone {
        url: String,
        #[source]
        err: VcsError,
    },

    #[error("could not check out {target}")]
    Checkout {
        target: String,
        #[source]
        err: VcsError,
    },

    #[error("could not determine the {what} of the working copy")]
    Inspect {
        what: &'static str,
        #[source]
        err: VcsError,
    },

    #[error("'{import_path}' is already vendored")]
    DuplicateImportPath { import_path: String },

    #[error("'{import_path}' overlaps '{vendored}', which is already vendored")]
    OverlapsVendored {
        import_path: String,
        vendored: String,
    },

    #[error("{} already exists in the vendor tree", dst.display())]
    DestinationExists { dst: PathBuf },

    #[error("'{sub_path}' is not a directory in the repository for '{import_path}'")]
    MissingSubPath {
        import_path: String,
        sub_path: String,
    },

    #[error("failed to copy {} to {}", src.display(), dst.display())]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("failed to remove working copy {}", dir.display())]
    Cleanup {
        dir: PathBuf,
        #[source]
        err: std::io::Error,
    },
}

impl ErrorInner {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::ConflictingFlags { .. } => ErrorKind::ConflictingFlags,
            Self::ManifestRead { .. }
            | Self::ManifestParse { .. }
            | Self::ManifestInvalid { .. } => ErrorKind::ManifestRead,
            Self::ManifestLocked { .. } => ErrorKind::ManifestLocked,
            Self::ManifestWrite { .. } | Self::ManifestSerialize(_) => ErrorKind::ManifestWrite,
            Self::Resolution { .. } => ErrorKind::Resolution,
            Self::Clone { .. } => ErrorKind::Fetch,
            Self::Checkout { .. } | Self::Inspect { .. } => ErrorKind::Checkout,
            Self::DuplicateImportPath { .. } | Self::OverlapsVendored { .. } => {
                ErrorKind::DuplicateImportPath
            }
            Self::MissingSubPath { .. } | Self::DestinationExists { .. } | Self::Copy { .. } => {
                ErrorKind::Copy
            }
            Self::Cleanup { .. } => ErrorKind::Cleanup,
        }
    }
}

/// The error type for every fallible operation in this crate.
///
/// The inner error is boxed to keep `Result<_, Error>` small, and carries the context of what was
/// being done when the failure happened. Use [`Error::kind`] to branch on the category.
#[derive(Debug)]
pub struct Error(Box<ErrorInner>, ErrorKind);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<ErrorInner> for Error {
    fn from(inner: ErrorInner) -> Self {
        let kind = inner.kind();
        Self(Box::new(inner), kind)
    }
}

impl Error {
    /// Get the error kind for pattern matching
    pub fn kind(&self) -> ErrorKind {
        self.1
    }

    /// Get the underlying error variant
    pub fn inner(&self) -> &ErrorInner {
        &self.0
    }

    pub(crate) fn conflicting_flags(branch: &str, revision: &str) -> Self {
        ErrorInner::ConflictingFlags {
            branch: branch.to_string(),
            revision: revision.to_string(),
        }
        .into()
    }

    pub(crate) fn manifest_read(path: &Path, err: std::io::Error) -> Self {
        ErrorInner::ManifestRead {
            path: path.to_path_buf(),
            err,
        }
        .into()
    }

    pub(crate) fn manifest_parse(path: &Path, err: serde_json::Error) -> Self {
        ErrorInner::ManifestParse {
            path: path.to_path_buf(),
            err,
        }
        .into()
    }

    pub(crate) fn manifest_invalid(path: &Path, reason: String) -> Self {
        ErrorInner::ManifestInvalid {
            path: path.to_path_buf(),
            reason,
        }
        .into()
    }

    pub(crate) fn manifest_locked(lock: &Path) -> Self {
        ErrorInner::ManifestLocked {
            lock: lock.to_path_buf(),
        }
        .into()
    }

    pub(crate) fn manifest_write(path: &Path, err: std::io::Error) -> Self {
        ErrorInner::ManifestWrite {
            path: path.to_path_buf(),
            err,
        }
        .into()
    }

    pub(crate) fn manifest_serialize(err: serde_json::Error) -> Self {
        ErrorInner::ManifestSerialize(err).into()
    }

    pub(crate) fn resolution<S: Into<String>>(import_path: &str, reason: S) -> Self {
        ErrorInner::Resolution {
            import_path: import_path.to_string(),
            reason: reason.into(),
        }
        .into()
    }

    pub(crate) fn clone_failed<E: Into<VcsError>>(url: &str, err: E) -> Self {
        ErrorInner::Clone {
            url: url.to_string(),
            err: err.into(),
        }
        .into()
    }

    pub(crate) fn checkout<E: Into<VcsError>>(target: String, err: E) -> Self {
        ErrorInner::Checkout {
            target,
            err: err.into(),
        }
        .into()
    }

    pub(crate) fn inspect<E: Into<VcsError>>(what: &'static str, err: E) -> Self {
        ErrorInner::Inspect {
            what,
            err: err.into(),
        }
        .into()
    }

    pub(crate) fn duplicate_import_path(import_path: &str) -> Self {
        ErrorInner::DuplicateImportPath {
            import_path: import_path.to_string(),
        }
        .into()
    }

    pub(crate) fn overlaps_vendored(import_path: &str, vendored: &str) -> Self {
        ErrorInner::OverlapsVendored {
            import_path: import_path.to_string(),
            vendored: vendored.to_string(),
        }
        .into()
    }

    pub(crate) fn destination_exists(dst: &Path) -> Self {
        ErrorInner::DestinationExists {
            dst: dst.to_path_buf(),
        }
        .into()
    }

    pub(crate) fn missing_sub_path(import_path: &str, sub_path: &str) -> Self {
        ErrorInner::MissingSubPath {
            import_path: import_path.to_string(),
            sub_path: sub_path.to_string(),
        }
        .into()
    }

    pub(crate) fn copy(src: &Path, dst: &Path, err: std::io::Error) -> Self {
        ErrorInner::Copy {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            err,
        }
        .into()
    }

    pub(crate) fn cleanup(dir: &Path, err: std::io::Error) -> Self {
        ErrorInner::Cleanup {
            dir: dir.to_path_buf(),
            err,
        }
        .into()
    }
}
