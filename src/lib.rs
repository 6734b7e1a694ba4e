//! Runtime for check/in/out resource plugins.
//!
//! A plugin is one binary that the orchestrator runs under three names:
//! `<root>/check`, `<root>/in` and `<root>/out`. The crate turns a plugin's
//! [`Checker`], [`Getter`] and [`Putter`] implementations into that binary:
//! [`ResourceType::run`] picks the verb from argument zero, decodes exactly one
//! strict JSON request from stdin, calls the capability, and writes exactly one
//! JSON response to stdout. Invoked under any other name with `install`, the
//! binary links the entry points for the verbs it implements back to itself.
//! `install` must be the only argument: trailing arguments are rejected rather
//! than ignored.
//!
//! ```no_run
//! use resource_runner::{Checker, CheckRequest, ResourceType};
//!
//! struct Latest;
//!
//! impl Checker<String, String> for Latest {
//!     fn check(&self, request: CheckRequest<String, String>) -> anyhow::Result<Vec<String>> {
//!         Ok(vec![request.source])
//!     }
//! }
//!
//! ResourceType::<String, String, (), ()>::new()
//!     .with_checker(Latest)
//!     .run_with_process_args()?;
//! # Ok::<(), resource_runner::ResourceError>(())
//! ```

use std::env;
use std::path::PathBuf;

pub mod capability;
pub mod entry_points;
pub mod error;
pub mod install;
pub mod logging;
pub mod models;
pub mod resource;

pub use capability::{Checker, Getter, Putter};
pub use entry_points::{EntryPoints, Invocation, Verb};
pub use error::ResourceError;
pub use models::{CheckRequest, GetRequest, MetadataField, PutRequest, Response};
pub use resource::ResourceType;

/// Where the orchestrator looks for `check`, `in` and `out`.
pub const DEFAULT_INSTALL_ROOT: &str = "/opt/resource";

/// Runtime override for the install root.
pub const INSTALL_ROOT_ENV: &str = "RESOURCE_INSTALL_ROOT";

/// Absolute, non-empty path from a configuration hint.
fn root_from_hint(hint: &str) -> Option<PathBuf> {
    let trimmed = hint.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = PathBuf::from(trimmed);
    candidate.is_absolute().then_some(candidate)
}

/// Resolve the install root.
///
/// Search order: `RESOURCE_INSTALL_ROOT` when it holds an absolute path, then
/// the `RESOURCE_INSTALL_ROOT_HINT` baked in at build time, then
/// [`DEFAULT_INSTALL_ROOT`]. Relative values are ignored rather than resolved
/// against whatever directory the orchestrator happens to use.
pub fn install_root_from_env() -> PathBuf {
    if let Some(root) = env::var(INSTALL_ROOT_ENV)
        .ok()
        .and_then(|value| root_from_hint(&value))
    {
        return root;
    }

    if let Some(root) = option_env!("RESOURCE_INSTALL_ROOT_HINT").and_then(root_from_hint) {
        return root;
    }

    PathBuf::from(DEFAULT_INSTALL_ROOT)
}
