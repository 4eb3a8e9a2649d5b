use std::process::ExitCode;

use vendor_fetch::ErrorKind;

/// Categories of application errors that can be matched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorKind {
    /// Argument validation errors, including a branch and a revision given together
    ArgValidation,
    /// General IO errors
    IO,
    /// The manifest could not be read, written or locked
    Manifest,
    /// Fetching the dependency failed
    Fetch,
    /// Writing the requested output format failed
    Output,
}

/// Internal error type that contains all application error variants.
#[derive(Debug, thiserror::Error)]
pub enum AppErrorInner {
    #[error("Argument error: {0}")]
    ArgValidation(String),
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("Failed to fetch '{import_path}'")]
    Fetch {
        import_path: String,
        #[source]
        err: vendor_fetch::Error,
    },
    #[error("Failed to load manifest")]
    Manifest(#[source] vendor_fetch::Error),
    #[error("Failed to format manifest as JSON")]
    Json(#[source] serde_json::Error),
    #[error("Failed to format manifest as TOML")]
    Toml(#[source] toml::ser::Error),
}

/// The main application-level error type. This represents all top-level application errors we'd
/// want to report to the user. The kind decides the exit code; the inner error keeps what the
/// application was doing when the library failed (e.g. which import path was being fetched).
///
/// This type uses the newtype pattern to wrap a boxed inner error, reducing stack size.
#[derive(Debug)]
pub struct AppError(Box<AppErrorInner>, AppErrorKind);

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl AppError {
    /// Create a new AppError with the given inner error and kind
    pub fn new(inner: AppErrorInner, kind: AppErrorKind) -> Self {
        Self(Box::new(inner), kind)
    }

    /// Get the error kind for pattern matching
    pub fn error_kind(&self) -> &AppErrorKind {
        &self.1
    }

    /// Create an argument validation error
    pub fn arg_validation(msg: String) -> Self {
        Self::new(AppErrorInner::ArgValidation(msg), AppErrorKind::ArgValidation)
    }

    /// Create a fetch error, classified by what went wrong in the library
    pub fn fetch(import_path: String, err: vendor_fetch::Error) -> Self {
        let kind = match err.kind() {
            ErrorKind::ConflictingFlags => AppErrorKind::ArgValidation,
            ErrorKind::ManifestRead | ErrorKind::ManifestWrite | ErrorKind::ManifestLocked => {
                AppErrorKind::Manifest
            }
            _ => AppErrorKind::Fetch,
        };
        Self::new(AppErrorInner::Fetch { import_path, err }, kind)
    }

    /// Create a manifest load error
    pub fn manifest(err: vendor_fetch::Error) -> Self {
        Self::new(AppErrorInner::Manifest(err), AppErrorKind::Manifest)
    }

    pub fn json(err: serde_json::Error) -> Self {
        Self::new(AppErrorInner::Json(err), AppErrorKind::Output)
    }

    pub fn toml(err: toml::ser::Error) -> Self {
        Self::new(AppErrorInner::Toml(err), AppErrorKind::Output)
    }

    /// The process exit status reported for this error
    pub fn exit_code(&self) -> u8 {
        match self.error_kind() {
            AppErrorKind::ArgValidation => 2,
            AppErrorKind::Manifest => 3,
            AppErrorKind::Fetch | AppErrorKind::IO | AppErrorKind::Output => 1,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::new(AppErrorInner::IO(err), AppErrorKind::IO)
    }
}

impl From<AppError> for ExitCode {
    fn from(error: AppError) -> Self {
        ExitCode::from(error.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_map_to_exit_codes() {
        let project = std::env::temp_dir().join("vendor-cli-no-such-project");
        let fetcher = vendor_fetch::Fetcher::new(&project);
        let options = vendor_fetch::FetchOptions::new()
            .with_branch("main")
            .with_revision("abc");
        let err = fetcher.fetch("github.com/foo/bar", &options).unwrap_err();
        let app = AppError::fetch("github.com/foo/bar".to_string(), err);
        assert_eq!(app.error_kind(), &AppErrorKind::ArgValidation);
        assert_eq!(app.exit_code(), 2);

        let missing = project.join("vendor").join("manifest");
        let err = vendor_fetch::Manifest::load(&missing, vendor_fetch::MissingManifest::Error)
            .unwrap_err();
        assert_eq!(AppError::manifest(err).exit_code(), 3);
        assert_eq!(AppError::arg_validation("bad".to_string()).exit_code(), 2);
    }
}
