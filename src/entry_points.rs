//! Well-known entry points and invocation classification.
//!
//! The orchestrator runs `<root>/check`, `<root>/in` and `<root>/out`; all
//! three are links to the same plugin binary. Which verb to run is decided
//! solely by comparing the absolute path of argument zero against those
//! locations. Any other path is treated as a request to install.

use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Check,
    Get,
    Put,
}

impl Verb {
    pub const ALL: [Verb; 3] = [Verb::Check, Verb::Get, Verb::Put];

    /// File name of the entry point under the install root.
    pub fn entry_name(self) -> &'static str {
        match self {
            Verb::Check => "check",
            Verb::Get => "in",
            Verb::Put => "out",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Check => "check",
            Verb::Get => "get",
            Verb::Put => "put",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single process invocation should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invocation {
    Verb(Verb),
    Install,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The three entry-point paths derived from one install root.
pub struct EntryPoints {
    root: PathBuf,
}

impl EntryPoints {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, verb: Verb) -> PathBuf {
        self.root.join(verb.entry_name())
    }

    /// Map an absolute binary path onto the flow it selects.
    ///
    /// Both sides are cleaned lexically first, so `/opt/resource//check`,
    /// `/opt/resource/./check` and `/opt/resource/../resource/check` all select
    /// check. Symlinks are not resolved: every entry point is itself a link to
    /// the plugin binary.
    pub fn classify(&self, bin_path: &Path) -> Invocation {
        let bin_path = clean(bin_path);
        Verb::ALL
            .into_iter()
            .find(|verb| clean(&self.path(*verb)) == bin_path)
            .map(Invocation::Verb)
            .unwrap_or(Invocation::Install)
    }
}

/// Lexically drop `.` components and fold `..` into the preceding component.
///
/// `..` directly under the root stays at the root; leading `..` in a relative
/// path is kept.
pub fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
