//! Failures raised while dispatching an invocation.
//!
//! Each variant names the phase that failed and keeps the underlying cause as
//! its `source()`, so rendering with `{:#}` through `anyhow` yields
//! "phase: cause" chains on stderr.

use crate::entry_points::Verb;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    /// Argument zero was missing or could not be made absolute.
    #[error("could not determine path to binary {}", path.display())]
    BinaryPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A well-known entry point was invoked but the plugin lacks that verb.
    #[error("{} not implemented", entry_point.display())]
    NotImplemented { entry_point: PathBuf },

    /// The request on stdin was malformed or carried unknown fields.
    #[error("could not decode source")]
    Decode {
        verb: Verb,
        #[source]
        source: serde_json::Error,
    },

    /// Get and put need the working directory as argument one.
    #[error("missing target directory argument for {verb}")]
    MissingTargetDirectory { verb: Verb },

    /// The plugin's own capability returned an error.
    #[error("{verb} failed")]
    Capability {
        verb: Verb,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not encode {verb} response")]
    Encode {
        verb: Verb,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not output {verb} response")]
    Write {
        verb: Verb,
        #[source]
        source: std::io::Error,
    },

    /// Installing from a missing binary or through a symlink is refused.
    #[error("{} must not be a symbolic link", path.display())]
    SymbolicLink {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("unrecognized arguments {args:?}, only 'install' is allowed")]
    UnrecognizedArguments { args: Vec<String> },

    #[error("could not ensure {} exists", path.display())]
    InstallDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create {} link", entry_point.display())]
    Link {
        entry_point: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
