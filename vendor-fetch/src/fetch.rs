//! Fetching a dependency into the vendor tree and recording it in the manifest.

use std::path::{Path, PathBuf};

use crate::copy::copy_tree;
use crate::error::Error;
use crate::manifest::{Dependency, Manifest, ManifestLock, MissingManifest};
use crate::resolve::{HostingResolver, Resolve, to_relative_path, validate};
use crate::vcs::{Vcs, VcsKind, WorkingCopy};

/// What to check out when fetching.
///
/// With neither field set the tip of the repository's default branch is fetched. A branch and a
/// revision are mutually exclusive. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub branch: Option<String>,
    pub revision: Option<String>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch<S: Into<String>>(mut self, branch: S) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_revision<S: Into<String>>(mut self, revision: S) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref().filter(|branch| !branch.is_empty())
    }

    pub fn revision(&self) -> &str {
        self.revision.as_deref().unwrap_or_default()
    }

    /// Fails with [`ErrorKind::ConflictingFlags`](crate::ErrorKind::ConflictingFlags) when both a
    /// branch and a revision are requested.
    pub fn validate(&self) -> Result<(), Error> {
        match self.branch() {
            Some(branch) if !self.revision().is_empty() => {
                Err(Error::conflicting_flags(branch, self.revision()))
            }
            _ => Ok(()),
        }
    }
}

type Driver = Box<dyn Fn(VcsKind) -> Box<dyn Vcs>>;

/// Fetches dependencies into one project.
///
/// ```no_run
/// use vendor_fetch::{Fetcher, FetchOptions};
///
/// let fetcher = Fetcher::new("/path/to/project");
/// let dep = fetcher.fetch("github.com/foo/bar/sub", &FetchOptions::new())?;
/// println!("vendored {} at {}", dep.import_path, dep.revision);
/// # Ok::<(), vendor_fetch::Error>(())
/// ```
pub struct Fetcher {
    project_dir: PathBuf,
    resolver: Box<dyn Resolve>,
    driver: Driver,
    missing_manifest: MissingManifest,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("project_dir", &self.project_dir)
            .field("missing_manifest", &self.missing_manifest)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    pub fn new<P: Into<PathBuf>>(project_dir: P) -> Self {
        Self {
            project_dir: project_dir.into(),
            resolver: Box::new(HostingResolver),
            driver: Box::new(VcsKind::driver),
            missing_manifest: MissingManifest::default(),
        }
    }

    /// Use `resolver` to map import paths onto repositories.
    pub fn with_resolver<R: Resolve + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Use `driver` to pick the backend for each kind of repository.
    pub fn with_driver<F>(mut self, driver: F) -> Self
    where
        F: Fn(VcsKind) -> Box<dyn Vcs> + 'static,
    {
        self.driver = Box::new(driver);
        self
    }

    pub fn with_missing_manifest(mut self, missing_manifest: MissingManifest) -> Self {
        self.missing_manifest = missing_manifest;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        crate::manifest::manifest_path(&self.project_dir)
    }

    /// Where the files of `import_path` are vendored.
    pub fn destination(&self, import_path: &str) -> PathBuf {
        self.vendor_src().join(to_relative_path(import_path))
    }

    fn vendor_src(&self) -> PathBuf {
        self.project_dir.join("vendor").join("src")
    }

    /// Fetch `import_path`, copy it into the vendor tree and record it in the manifest.
    ///
    /// The manifest and the vendor tree are only changed when the whole fetch succeeds, so an
    /// import path is refused when its destination already exists or when it lies inside, or
    /// contains, an import path that is already vendored. The
    /// temporary working copy is removed on every path; if removing it fails after the
    /// dependency was recorded, the dependency stays recorded and the failure is returned.
    pub fn fetch(&self, import_path: &str, options: &FetchOptions) -> Result<Dependency, Error> {
        options.validate()?;
        // The import path names the destination, whatever resolver is in use.
        validate(import_path)?;
        let manifest_path = self.manifest_path();
        let _lock = ManifestLock::acquire(&manifest_path)?;
        let mut manifest = Manifest::load(&manifest_path, self.missing_manifest)?;
        if manifest.contains(import_path) {
            return Err(Error::duplicate_import_path(import_path));
        }
        if let Some(vendored) = manifest
            .iter()
            .find(|dep| nested(&dep.import_path, import_path))
        {
            return Err(Error::overlaps_vendored(import_path, &vendored.import_path));
        }
        let dst = self.destination(import_path);
        if dst.exists() {
            return Err(Error::destination_exists(&dst));
        }

        let (repository, sub_path) = self.resolver.resolve(import_path)?;
        tracing::info!(%import_path, %repository, %sub_path, "resolved import path");

        let vcs = (self.driver)(repository.kind);
        let mut working_copy = ScopedWorkingCopy(vcs.clone_repository(&repository)?);
        tracing::debug!(dir = %working_copy.dir().display(), "cloned {}", repository.url);

        match options.branch() {
            Some(branch) => working_copy.checkout_branch(branch)?,
            None => working_copy.checkout_revision(options.revision())?,
        }
        let revision = working_copy.revision()?;
        let branch = working_copy.branch()?;
        tracing::info!(%revision, %branch, "checked out");

        let dependency = Dependency {
            import_path: import_path.to_string(),
            repository: repository.url,
            revision,
            branch,
            path: sub_path,
        };
        manifest.add_dependency(dependency.clone())?;

        let src = dependency.source_dir(working_copy.dir());
        if !src.is_dir() {
            return Err(Error::missing_sub_path(import_path, &dependency.path));
        }
        let destination = DestinationGuard::new(&dst, &self.project_dir);
        copy_tree(&dst, &src)?;
        manifest.save(&manifest_path)?;
        destination.keep();
        tracing::info!(%import_path, dst = %dst.display(), "vendored");

        working_copy.finish()?;
        Ok(dependency)
    }
}

/// Whether one import path lies inside the other, element by element.
fn nested(a: &str, b: &str) -> bool {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    longer
        .strip_prefix(shorter)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Owns a working copy for the length of one fetch and removes it however the fetch ends.
struct ScopedWorkingCopy(Box<dyn WorkingCopy>);

impl ScopedWorkingCopy {
    /// Remove the working copy, reporting failure to the caller rather than the log.
    fn finish(mut self) -> Result<(), Error> {
        self.0.destroy()
    }
}

impl std::ops::Deref for ScopedWorkingCopy {
    type Target = dyn WorkingCopy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::ops::DerefMut for ScopedWorkingCopy {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl Drop for ScopedWorkingCopy {
    fn drop(&mut self) {
        if let Err(err) = self.0.destroy() {
            tracing::warn!("{err}");
        }
    }
}

/// Removes whatever a failed fetch created under the vendor tree.
struct DestinationGuard {
    /// Topmost directory on the way to the destination that did not exist beforehand.
    created: Option<PathBuf>,
}

impl DestinationGuard {
    fn new(dst: &Path, project_dir: &Path) -> Self {
        let created = dst
            .ancestors()
            .take_while(|dir| *dir != project_dir && !dir.exists())
            .last()
            .map(Path::to_path_buf);
        Self { created }
    }

    fn keep(mut self) {
        self.created = None;
    }
}

impl Drop for DestinationGuard {
    fn drop(&mut self) {
        if let Some(dir) = self.created.take() {
            tracing::debug!(dir = %dir.display(), "removing partially vendored tree");
            if let Err(err) = std::fs::remove_dir_all(&dir)
                && err.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(
                    dir = %dir.display(),
                    %err,
                    "failed to remove partially vendored tree"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::rc::Rc;

    use super::*;
    use crate::ErrorKind;
    use crate::vcs::{Repository, VcsError};

    const TIP: &str = "1111111111111111111111111111111111111111";
    const OLD: &str = "2222222222222222222222222222222222222222";

    /// Shared view of what the fake backend did.
    #[derive(Default)]
    struct Calls {
        clones: Cell<usize>,
        removals: Cell<usize>,
        fail_destroy: Cell<bool>,
        on_checkout: RefCell<Option<Box<dyn Fn()>>>,
    }

    struct FakeVcs(Rc<Calls>);

    impl Vcs for FakeVcs {
        fn kind(&self) -> VcsKind {
            VcsKind::Git
        }

        fn clone_repository(
            &self,
            repository: &Repository,
        ) -> Result<Box<dyn WorkingCopy>, Error> {
            if repository.url.contains("missing") {
                return Err(Error::clone_failed(
                    &repository.url,
                    VcsError::Unsupported("no such repository".to_string()),
                ));
            }
            self.0.clones.set(self.0.clones.get() + 1);
            let root = tempfile::tempdir().unwrap();
            fs::write(root.path().join("README"), "root").unwrap();
            fs::create_dir_all(root.path().join("sub")).unwrap();
            fs::write(root.path().join("sub/lib.txt"), "sub").unwrap();
            fs::create_dir_all(root.path().join(".git")).unwrap();
            fs::write(root.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();
            Ok(Box::new(FakeWorkingCopy {
                dir: root.path().to_path_buf(),
                root: Some(root),
                revision: TIP.to_string(),
                branch: "main".to_string(),
                calls: self.0.clone(),
            }))
        }
    }

    struct FakeWorkingCopy {
        dir: PathBuf,
        root: Option<tempfile::TempDir>,
        revision: String,
        branch: String,
        calls: Rc<Calls>,
    }

    impl FakeWorkingCopy {
        fn checked_out(&self) {
            if let Some(hook) = self.calls.on_checkout.borrow().as_ref() {
                hook();
            }
        }
    }

    impl WorkingCopy for FakeWorkingCopy {
        fn dir(&self) -> &Path {
            &self.dir
        }

        fn checkout_branch(&mut self, branch: &str) -> Result<(), Error> {
            if branch != "main" && branch != "dev" {
                return Err(Error::checkout(
                    format!("branch '{branch}'"),
                    VcsError::Unsupported("no such branch".to_string()),
                ));
            }
            self.branch = branch.to_string();
            self.checked_out();
            Ok(())
        }

        fn checkout_revision(&mut self, revision: &str) -> Result<(), Error> {
            match revision {
                "" => {}
                "2222" => self.revision = OLD.to_string(),
                _ => {
                    return Err(Error::checkout(
                        format!("revision '{revision}'"),
                        VcsError::Unsupported("no such revision".to_string()),
                    ));
                }
            }
            self.checked_out();
            Ok(())
        }

        fn revision(&self) -> Result<String, Error> {
            Ok(self.revision.clone())
        }

        fn branch(&self) -> Result<String, Error> {
            Ok(self.branch.clone())
        }

        fn destroy(&mut self) -> Result<(), Error> {
            if self.calls.fail_destroy.get() {
                return Err(Error::cleanup(
                    &self.dir,
                    std::io::Error::other("device busy"),
                ));
            }
            if let Some(root) = self.root.take() {
                self.calls.removals.set(self.calls.removals.get() + 1);
                root.close().map_err(|err| Error::cleanup(&self.dir, err))?;
            }
            Ok(())
        }
    }

    /// Resolves `example.com/<repo>[/sub]` without touching the network.
    fn local_resolver(import_path: &str) -> Result<(Repository, String), Error> {
        let mut parts = import_path.splitn(3, '/');
        match (parts.next(), parts.next()) {
            (Some("example.com"), Some(repo)) => Ok((
                Repository::new(format!("https://example.com/{repo}"), VcsKind::Git),
                parts.next().unwrap_or_default().to_string(),
            )),
            _ => Err(Error::resolution(import_path, "not an example.com path")),
        }
    }

    fn fetcher(project: &Path) -> (Fetcher, Rc<Calls>) {
        let calls = Rc::new(Calls::default());
        let driver_calls = calls.clone();
        let fetcher = Fetcher::new(project)
            .with_resolver(local_resolver)
            .with_driver(move |_| Box::new(FakeVcs(driver_calls.clone())));
        (fetcher, calls)
    }

    fn load(fetcher: &Fetcher) -> Manifest {
        Manifest::load(fetcher.manifest_path(), MissingManifest::Error).unwrap()
    }

    #[test]
    fn options_validation() {
        assert!(FetchOptions::new().validate().is_ok());
        assert!(FetchOptions::new().with_branch("dev").validate().is_ok());
        assert!(FetchOptions::new().with_revision("abc").validate().is_ok());
        assert!(
            FetchOptions::new()
                .with_branch("dev")
                .with_revision("")
                .validate()
                .is_ok()
        );
        let err = FetchOptions::new()
            .with_branch("dev")
            .with_revision("abc")
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictingFlags);
    }

    #[test]
    fn fetch_sub_package_records_and_copies() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let dep = fetcher
            .fetch("example.com/bar/sub", &FetchOptions::new())
            .unwrap();
        assert_eq!(dep.repository, "https://example.com/bar");
        assert_eq!(dep.path, "sub");
        assert_eq!(dep.revision, TIP);
        assert_eq!(dep.branch, "main");

        let manifest = load(&fetcher);
        assert_eq!(manifest.dependencies(), std::slice::from_ref(&dep));
        let dst = fetcher.destination("example.com/bar/sub");
        assert_eq!(fs::read_to_string(dst.join("lib.txt")).unwrap(), "sub");
        assert!(!dst.join("README").exists());
        assert_eq!(calls.removals.get(), 1);
        assert!(!project.path().join("vendor/manifest.lock").exists());
    }

    #[test]
    fn fetch_whole_repository_skips_metadata() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, _) = fetcher(project.path());
        fetcher
            .fetch("example.com/bar", &FetchOptions::new().with_branch("dev"))
            .unwrap();
        let dst = fetcher.destination("example.com/bar");
        assert!(dst.join("README").is_file());
        assert!(dst.join("sub/lib.txt").is_file());
        assert!(!dst.join(".git").exists());
        assert_eq!(load(&fetcher).get("example.com/bar").unwrap().branch, "dev");
    }

    #[test]
    fn fetch_revision_records_resolved_revision() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, _) = fetcher(project.path());
        let dep = fetcher
            .fetch("example.com/bar", &FetchOptions::new().with_revision("2222"))
            .unwrap();
        assert_eq!(dep.revision, OLD);
        assert_eq!(dep.branch, "main");
    }

    #[test]
    fn conflicting_flags_touch_nothing() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let options = FetchOptions::new().with_branch("dev").with_revision("2222");
        let err = fetcher.fetch("example.com/bar", &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictingFlags);
        assert_eq!(calls.clones.get(), 0);
        assert_eq!(fs::read_dir(project.path()).unwrap().count(), 0);
    }

    #[test]
    fn unknown_branch_leaves_project_untouched() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let err = fetcher
            .fetch("example.com/bar", &FetchOptions::new().with_branch("nope"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Checkout);
        assert_eq!(calls.clones.get(), 1);
        assert_eq!(calls.removals.get(), 1);
        assert_eq!(fs::read_dir(project.path()).unwrap().count(), 0);
    }

    #[test]
    fn unknown_revision_is_checkout_error() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let err = fetcher
            .fetch("example.com/bar", &FetchOptions::new().with_revision("ffff"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Checkout);
        assert_eq!(calls.removals.get(), 1);
    }

    #[test]
    fn resolution_and_clone_failures() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let err = fetcher
            .fetch("elsewhere.org/bar", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        let err = fetcher
            .fetch("example.com/missing", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(calls.clones.get(), 0);
        assert_eq!(fs::read_dir(project.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_sub_path_is_copy_error() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let err = fetcher
            .fetch("example.com/bar/nothing/here", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Copy);
        assert_eq!(calls.removals.get(), 1);
        assert!(!project.path().join("vendor").exists());
    }

    #[test]
    fn duplicate_fetch_fails_before_cloning() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        fetcher
            .fetch("example.com/bar", &FetchOptions::new())
            .unwrap();
        let before = fs::read(fetcher.manifest_path()).unwrap();
        let err = fetcher
            .fetch("example.com/bar", &FetchOptions::new().with_branch("dev"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateImportPath);
        assert_eq!(calls.clones.get(), 1);
        assert_eq!(fs::read(fetcher.manifest_path()).unwrap(), before);
    }

    #[test]
    fn failed_save_removes_copied_tree() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        // A directory in the manifest's place makes the final rename fail.
        let manifest_path = fetcher.manifest_path();
        *calls.on_checkout.borrow_mut() = Some(Box::new(move || {
            fs::create_dir_all(&manifest_path).unwrap();
        }));
        let err = fetcher
            .fetch("example.com/bar/sub", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ManifestWrite);
        assert!(!project.path().join("vendor/src").exists());
        assert_eq!(calls.removals.get(), 1);
    }

    #[test]
    fn existing_destination_is_not_overwritten() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let dst = fetcher.destination("example.com/bar");
        fs::create_dir_all(dst.join("sub")).unwrap();
        fs::write(dst.join("sub/lib.txt"), "stale").unwrap();
        let err = fetcher
            .fetch("example.com/bar", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Copy);
        assert_eq!(calls.clones.get(), 0);
        assert_eq!(fs::read_to_string(dst.join("sub/lib.txt")).unwrap(), "stale");
    }

    #[test]
    fn failed_fetch_inside_vendored_package_keeps_its_files() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        fetcher
            .fetch("example.com/bar", &FetchOptions::new())
            .unwrap();
        let vendored = fetcher.destination("example.com/bar").join("sub/lib.txt");
        fs::write(&vendored, "recorded-revision").unwrap();
        let before = fs::read(fetcher.manifest_path()).unwrap();

        // Should the copy ever run, the save after it fails.
        let manifest_path = fetcher.manifest_path();
        *calls.on_checkout.borrow_mut() = Some(Box::new(move || {
            fs::remove_file(&manifest_path).unwrap();
            fs::create_dir_all(&manifest_path).unwrap();
        }));
        let err = fetcher
            .fetch("example.com/bar/sub", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateImportPath);
        assert_eq!(calls.clones.get(), 1);
        assert_eq!(fs::read_to_string(&vendored).unwrap(), "recorded-revision");
        assert_eq!(fs::read(fetcher.manifest_path()).unwrap(), before);
    }

    #[test]
    fn enclosing_import_path_of_vendored_package_is_rejected() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        fetcher
            .fetch("example.com/bar/sub", &FetchOptions::new())
            .unwrap();
        let err = fetcher
            .fetch("example.com/bar", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateImportPath);
        assert_eq!(calls.clones.get(), 1);
        assert_eq!(load(&fetcher).len(), 1);
    }

    #[test]
    fn nested_compares_whole_elements() {
        assert!(nested("example.com/bar", "example.com/bar"));
        assert!(nested("example.com/bar", "example.com/bar/sub"));
        assert!(nested("example.com/bar/sub", "example.com/bar"));
        assert!(!nested("example.com/bar", "example.com/barn"));
        assert!(!nested("example.com/bar/a", "example.com/bar/b"));
    }

    #[test]
    fn import_path_is_validated_whatever_the_resolver() {
        let project = tempfile::tempdir().unwrap();
        let calls = Rc::new(Calls::default());
        let driver_calls = calls.clone();
        let fetcher = Fetcher::new(project.path().join("app"))
            .with_resolver(|_: &str| -> Result<(Repository, String), Error> {
                Ok((
                    Repository::new("https://example.com/any", VcsKind::Git),
                    String::new(),
                ))
            })
            .with_driver(move |_| Box::new(FakeVcs(driver_calls.clone())));
        fs::create_dir_all(fetcher.project_dir()).unwrap();
        for import_path in ["example.com/../../../escape", "../../escape", "/tmp/escape"] {
            let err = fetcher
                .fetch(import_path, &FetchOptions::new())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Resolution, "{import_path}");
        }
        assert_eq!(calls.clones.get(), 0);
        assert_eq!(fs::read_dir(project.path()).unwrap().count(), 1);
        assert_eq!(fs::read_dir(fetcher.project_dir()).unwrap().count(), 0);
    }

    #[test]
    fn cleanup_failure_is_reported_after_recording() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        calls.fail_destroy.set(true);
        let err = fetcher
            .fetch("example.com/bar", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cleanup);
        assert!(load(&fetcher).contains("example.com/bar"));
        assert!(fetcher.destination("example.com/bar").join("README").is_file());
    }

    #[test]
    fn concurrent_fetch_is_rejected() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let _held = ManifestLock::acquire(fetcher.manifest_path()).unwrap();
        let err = fetcher
            .fetch("example.com/bar", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ManifestLocked);
        assert_eq!(calls.clones.get(), 0);
    }

    #[test]
    fn required_manifest_must_exist() {
        let project = tempfile::tempdir().unwrap();
        let (fetcher, calls) = fetcher(project.path());
        let fetcher = fetcher.with_missing_manifest(MissingManifest::Error);
        let err = fetcher
            .fetch("example.com/bar", &FetchOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ManifestRead);
        assert_eq!(calls.clones.get(), 0);
    }
}
