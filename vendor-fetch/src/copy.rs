//! Copying a package out of a working copy into the vendor tree.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Error;

/// Names of version control metadata entries that never get vendored.
pub const VCS_METADATA: &[&str] = &[".git", ".hg", ".bzr", ".svn"];

fn is_vcs_metadata(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| VCS_METADATA.contains(&name))
}

/// Recursively copy the contents of `src` into `dst`, creating `dst` and any missing
/// directories along the way.
///
/// Version control metadata is skipped at every level. Symbolic links are not followed and not
/// copied. Regular files keep their permission bits.
pub fn copy_tree<P: AsRef<Path>, Q: AsRef<Path>>(dst: P, src: Q) -> Result<(), Error> {
    let (dst, src) = (dst.as_ref(), src.as_ref());
    let walker = WalkDir::new(src)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_vcs_metadata(entry));
    let mut files = 0usize;
    for entry in walker {
        let entry = entry.map_err(|err| {
            let at = err.path().unwrap_or(src).to_path_buf();
            Error::copy(&at, dst, err.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| {
                Error::copy(
                    entry.path(),
                    dst,
                    std::io::Error::other("entry outside the source tree"),
                )
            })?;
        let target = dst.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|err| Error::copy(entry.path(), &target, err))?;
        } else if file_type.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| Error::copy(entry.path(), &target, err))?;
            }
            fs::copy(entry.path(), &target)
                .map_err(|err| Error::copy(entry.path(), &target, err))?;
            files += 1;
        } else {
            tracing::debug!(path = %entry.path().display(), "skipping non-regular file");
        }
    }
    tracing::debug!(src = %src.display(), dst = %dst.display(), files, "copied tree");
    Ok(())
}
