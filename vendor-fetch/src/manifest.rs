//! The manifest: the record of every vendored dependency and where it came from.
//!
//! The manifest is a JSON document kept at `vendor/manifest` in the project:
//!
//! ```json
//! {
//!   "version": 0,
//!   "dependencies": [
//!     {
//!       "importpath": "github.com/foo/bar/sub",
//!       "repository": "https://github.com/foo/bar",
//!       "revision": "3f4c1e0b0a6c1e0f9d1c8e7b6a5d4c3b2a190817",
//!       "branch": "main",
//!       "path": "sub"
//!     }
//!   ]
//! }
//! ```
//!
//! Dependencies keep the order they were added in, so saving a loaded manifest reproduces it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// The manifest format version written by this crate.
pub const MANIFEST_VERSION: u32 = 0;

/// Location of the manifest relative to the project root.
pub fn manifest_path<P: AsRef<Path>>(project_dir: P) -> PathBuf {
    project_dir.as_ref().join("vendor").join("manifest")
}

/// How to treat a manifest file that does not exist yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingManifest {
    /// Start from an empty manifest.
    #[default]
    Empty,
    /// Report a read error.
    Error,
}

/// One vendored dependency: which import path, from which repository, at which revision.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Dependency {
    #[serde(rename = "importpath")]
    pub import_path: String,
    pub repository: String,
    pub revision: String,
    pub branch: String,
    /// Sub-directory of the repository holding the package; empty for the repository root.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

impl Dependency {
    /// Where this dependency's files live inside a checkout rooted at `checkout`.
    pub fn source_dir<P: AsRef<Path>>(&self, checkout: P) -> PathBuf {
        checkout
            .as_ref()
            .join(crate::resolve::to_relative_path(&self.path))
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}", self.import_path, self.repository)?;
        if !self.branch.is_empty() {
            write!(f, ", branch: {}", self.branch)?;
        }
        write!(f, ", rev: {})", self.revision)
    }
}

/// The ordered set of vendored dependencies, unique by import path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Manifest {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    dependencies: Vec<Dependency>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            dependencies: Vec::new(),
        }
    }
}

impl Manifest {
    /// Loads the manifest at `path`. What happens when the file does not exist is decided by
    /// `missing`.
    pub fn load<P: AsRef<Path>>(path: P, missing: MissingManifest) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err)
                if err.kind() == std::io::ErrorKind::NotFound
                    && missing == MissingManifest::Empty =>
            {
                tracing::debug!(path = %path.display(), "no manifest yet, starting empty");
                return Ok(Self::default());
            }
            Err(err) => return Err(Error::manifest_read(path, err)),
        };
        let manifest: Self =
            serde_json::from_str(&contents).map_err(|err| Error::manifest_parse(path, err))?;
        if manifest.version > MANIFEST_VERSION {
            return Err(Error::manifest_invalid(
                path,
                format!("unsupported manifest version {}", manifest.version),
            ));
        }
        for (index, dep) in manifest.dependencies.iter().enumerate() {
            if manifest.dependencies[..index]
                .iter()
                .any(|earlier| earlier.import_path == dep.import_path)
            {
                return Err(Error::manifest_invalid(
                    path,
                    format!("'{}' is listed more than once", dep.import_path),
                ));
            }
        }
        Ok(manifest)
    }

    /// Saves the manifest to `path`. The file is replaced atomically: readers see either the old
    /// or the new contents, never a partial write.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let mut json = serde_json::to_string_pretty(self).map_err(Error::manifest_serialize)?;
        json.push('\n');
        write_atomic(path, json.as_bytes(), |_| Ok(()))
            .map_err(|err| Error::manifest_write(path, err))?;
        tracing::debug!(path = %path.display(), dependencies = self.len(), "saved manifest");
        Ok(())
    }

    /// Appends `dependency`, unless its import path is already present.
    pub fn add_dependency(&mut self, dependency: Dependency) -> Result<(), Error> {
        if self.contains(&dependency.import_path) {
            return Err(Error::duplicate_import_path(&dependency.import_path));
        }
        self.dependencies.push(dependency);
        Ok(())
    }

    /// Whether `import_path` is already vendored.
    pub fn contains(&self, import_path: &str) -> bool {
        self.get(import_path).is_some()
    }

    /// The dependency recorded for `import_path`, if any.
    pub fn get(&self, import_path: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|dep| dep.import_path == import_path)
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.dependencies.iter()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.dependencies.iter()
    }
}

impl IntoIterator for Manifest {
    type Item = Dependency;
    type IntoIter = std::vec::IntoIter<Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.dependencies.into_iter()
    }
}

/// Write `contents` to a temporary file next to `path`, then rename it over `path`.
/// `before_persist` runs once the temporary file is complete.
fn write_atomic<F>(path: &Path, contents: &[u8], before_persist: F) -> std::io::Result<()>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".manifest-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(contents)?;
    match fs::metadata(path) {
        Ok(existing) => tmp.as_file().set_permissions(existing.permissions())?,
        #[cfg(unix)]
        Err(_) => {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))?
        }
        #[cfg(not(unix))]
        Err(_) => {}
    }
    tmp.as_file().sync_all()?;
    before_persist(tmp.path())?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Exclusive claim on a manifest, held from load to save so concurrent fetches cannot interleave.
///
/// The lock is a `<manifest>.lock` file created with `create_new`; it is removed on drop.
#[derive(Debug)]
pub struct ManifestLock {
    path: PathBuf,
    created_dir: Option<PathBuf>,
}

impl ManifestLock {
    /// Take the lock for the manifest at `manifest`, failing if another fetch holds it.
    pub fn acquire<P: AsRef<Path>>(manifest: P) -> Result<Self, Error> {
        let manifest = manifest.as_ref();
        let mut name = manifest.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        let path = manifest.with_file_name(name);
        let created_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                fs::create_dir_all(dir).map_err(|err| Error::manifest_write(&path, err))?;
                Some(dir.to_path_buf())
            }
            _ => None,
        };
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                // Informational only; the file's existence is the lock.
                let _ = writeln!(file, "{}", std::process::id());
                tracing::debug!(lock = %path.display(), "acquired manifest lock");
                Ok(Self { path, created_dir })
            }
            Err(err) => {
                if let Some(dir) = created_dir {
                    let _ = fs::remove_dir(dir);
                }
                if err.kind() == std::io::ErrorKind::AlreadyExists {
                    Err(Error::manifest_locked(&path))
                } else {
                    Err(Error::manifest_write(&path, err))
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), %err, "failed to release manifest lock");
        }
        if let Some(dir) = &self.created_dir {
            // Only succeeds if nothing else was written there.
            let _ = fs::remove_dir(dir);
        }
    }
}
