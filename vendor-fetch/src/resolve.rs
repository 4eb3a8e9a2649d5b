//! Mapping import paths onto the repositories that host them.
//!
//! An import path names a package, e.g. `github.com/user/project/sub/pkg`. Resolution splits it
//! into the repository that holds the package (`https://github.com/user/project`, git) and the
//! path of the package inside that repository (`sub/pkg`). Resolution is a pure function of the
//! import path: no network requests are made.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::vcs::{Repository, VcsKind};

/// Maps an import path to `(repository, sub-path)`.
pub trait Resolve {
    fn resolve(&self, import_path: &str) -> Result<(Repository, String), Error>;
}

impl<F> Resolve for F
where
    F: Fn(&str) -> Result<(Repository, String), Error>,
{
    fn resolve(&self, import_path: &str) -> Result<(Repository, String), Error> {
        self(import_path)
    }
}

/// Resolves import paths using the conventions of well-known hosting sites, and the
/// `<host>/<path>.<vcs>` convention for everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostingResolver;

impl Resolve for HostingResolver {
    fn resolve(&self, import_path: &str) -> Result<(Repository, String), Error> {
        resolve(import_path)
    }
}

struct Host {
    name: &'static str,
    /// Number of path elements after the host that make up the repository root.
    root_elements: usize,
    kind: VcsKind,
}

const HOSTS: &[Host] = &[
    Host {
        name: "github.com",
        root_elements: 2,
        kind: VcsKind::Git,
    },
    Host {
        name: "gitlab.com",
        root_elements: 2,
        kind: VcsKind::Git,
    },
    Host {
        name: "bitbucket.org",
        root_elements: 2,
        kind: VcsKind::Git,
    },
    Host {
        name: "launchpad.net",
        root_elements: 1,
        kind: VcsKind::Bazaar,
    },
];

static VCS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<root>(?:[a-z0-9\-]+\.)+[a-z0-9\-]+(?::[0-9]+)?/[A-Za-z0-9_.~\-/]*?)\.(?P<vcs>bzr|git|hg|svn)(?:/(?P<sub>.+))?$",
    )
    .expect("the vcs suffix pattern is valid")
});

static HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9\-]+\.)+[a-z0-9\-]+(?::[0-9]+)?$").expect("the host pattern is valid")
});

static ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.~\-]+$").expect("the path element pattern is valid")
});

/// Resolve `import_path` to the repository that hosts it and the path inside that repository.
pub fn resolve(import_path: &str) -> Result<(Repository, String), Error> {
    validate(import_path)?;
    let elements = import_path.split('/').collect::<Vec<_>>();
    if let Some(host) = HOSTS.iter().find(|h| h.name == elements[0]) {
        let root = host.root_elements + 1;
        if elements.len() < root {
            return Err(Error::resolution(
                import_path,
                format!(
                    "{} import paths need at least {} path element(s) after the host",
                    host.name, host.root_elements
                ),
            ));
        }
        let url = format!("https://{}", elements[..root].join("/"));
        let sub_path = elements[root..].join("/");
        return Ok((Repository::new(url, host.kind), sub_path));
    }
    if let Some(captures) = VCS_SUFFIX.captures(import_path) {
        let vcs = &captures["vcs"];
        let kind = VcsKind::from_suffix(vcs)
            .ok_or_else(|| Error::resolution(import_path, format!("unknown vcs suffix '{vcs}'")))?;
        let url = format!("https://{}.{vcs}", &captures["root"]);
        let sub_path = captures
            .name("sub")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        return Ok((Repository::new(url, kind), sub_path));
    }
    Err(Error::resolution(
        import_path,
        "unsupported host; name the repository root with a .git, .hg, .bzr or .svn suffix",
    ))
}

/// Check that `import_path` is a well-formed relative path starting with a host name.
pub(crate) fn validate(import_path: &str) -> Result<(), Error> {
    if import_path.is_empty() {
        return Err(Error::resolution(import_path, "import path is empty"));
    }
    if import_path.contains("://") {
        return Err(Error::resolution(
            import_path,
            "import paths do not include a scheme",
        ));
    }
    if import_path.starts_with('/') || import_path.contains('\\') {
        return Err(Error::resolution(
            import_path,
            "import paths are relative and use '/' as separator",
        ));
    }
    let mut elements = import_path.split('/');
    if !elements.next().is_some_and(|host| HOST.is_match(host)) {
        return Err(Error::resolution(
            import_path,
            "the first path element must be a host name",
        ));
    }
    for element in elements {
        if element.is_empty() || element == "." || element == ".." {
            return Err(Error::resolution(
                import_path,
                format!("invalid path element '{element}'"),
            ));
        }
        if !ELEMENT.is_match(element) {
            return Err(Error::resolution(
                import_path,
                format!("invalid characters in path element '{element}'"),
            ));
        }
    }
    Ok(())
}

/// Convert a `/`-separated import path or sub-path into a relative filesystem path.
pub fn to_relative_path<S: AsRef<str>>(path: S) -> PathBuf {
    path.as_ref()
        .split('/')
        .filter(|element| !element.is_empty())
        .collect()
}
