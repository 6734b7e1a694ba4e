//! Self-installation: link the well-known entry points to this binary.
//!
//! Runs when the binary is invoked under any name other than an entry point.
//! The binary must be a real file so the links never chain through another
//! link, and only verbs the plugin implements get an entry point.

use crate::entry_points::{EntryPoints, Verb};
use crate::error::ResourceError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const INSTALL_TARGET: &str = "resource_runner::install";
const INSTALL_COMMAND: &str = "install";

/// Validate the invocation and create one link per implemented verb.
///
/// `args` is the full argument list including argument zero; `implemented`
/// lists the verbs present in the capability set. Links already created stay
/// in place when a later one fails, and existing entries are never replaced.
pub fn install(
    bin_path: &Path,
    args: &[String],
    entry_points: &EntryPoints,
    implemented: &[Verb],
) -> Result<Vec<PathBuf>, ResourceError> {
    ensure_real_binary(bin_path)?;

    if !matches!(args, [_, command] if command == INSTALL_COMMAND) {
        return Err(ResourceError::UnrecognizedArguments {
            args: args.to_vec(),
        });
    }

    let root = entry_points.root();
    fs::create_dir_all(root).map_err(|source| ResourceError::InstallDirectory {
        path: root.to_path_buf(),
        source,
    })?;

    let mut created = Vec::new();
    for verb in Verb::ALL {
        if !implemented.contains(&verb) {
            continue;
        }
        let entry_point = entry_points.path(verb);
        create_link(bin_path, &entry_point).map_err(|source| ResourceError::Link {
            entry_point: entry_point.clone(),
            source,
        })?;
        debug!(
            target: INSTALL_TARGET,
            entry_point = %entry_point.display(),
            binary = %bin_path.display(),
            "linked entry point"
        );
        created.push(entry_point);
    }

    Ok(created)
}

/// Refuse to install from a path that is missing or is itself a symlink.
fn ensure_real_binary(bin_path: &Path) -> Result<(), ResourceError> {
    match fs::symlink_metadata(bin_path) {
        Ok(meta) if !meta.file_type().is_symlink() => Ok(()),
        Ok(_) => Err(ResourceError::SymbolicLink {
            path: bin_path.to_path_buf(),
            source: None,
        }),
        Err(err) => Err(ResourceError::SymbolicLink {
            path: bin_path.to_path_buf(),
            source: Some(err),
        }),
    }
}

#[cfg(unix)]
fn create_link(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn create_link(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}
