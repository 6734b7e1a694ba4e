//! Resource plugin that tracks files in a local directory.
//!
//! Every regular file directly under `source.root` is a version, ordered by
//! file name. `check` reports new names, `in` copies one file into the build
//! directory and `out` publishes a file from the build directory into the
//! root. The integration suite drives this binary through the installed
//! entry points.

use anyhow::{Context, Result, bail};
use resource_runner::{
    CheckRequest, Checker, GetRequest, Getter, PutRequest, Putter, ResourceType, Response,
    logging,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let resource = Rc::new(DirResource);
    ResourceType::<Source, Version, GetParams, PutParams>::new()
        .with_checker(Rc::clone(&resource))
        .with_getter(Rc::clone(&resource))
        .with_putter(resource)
        .run_with_process_args()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Source {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Version {
    file: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GetParams {}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PutParams {
    /// Path of the file to publish, relative to the build directory.
    #[serde(default)]
    file: Option<PathBuf>,
}

struct DirResource;

impl Checker<Source, Version> for DirResource {
    fn check(&self, request: CheckRequest<Source, Version>) -> Result<Vec<Version>> {
        let names = list_versions(&request.source.root)?;
        let selected: Vec<String> = match request.version {
            Some(known) if names.contains(&known.file) => names
                .into_iter()
                .filter(|name| *name >= known.file)
                .collect(),
            // First check, or the known version was removed: report the latest.
            _ => names.into_iter().last().into_iter().collect(),
        };
        Ok(selected.into_iter().map(|file| Version { file }).collect())
    }
}

impl Getter<Source, Version, GetParams> for DirResource {
    fn get(
        &self,
        target_dir: &Path,
        request: GetRequest<Source, Version, GetParams>,
    ) -> Result<Response<Version>> {
        let name = plain_file_name(&request.version.file)?;
        let from = request.source.root.join(name);
        if !from.is_file() {
            bail!("version {} not found under {}", name, request.source.root.display());
        }

        fs::create_dir_all(target_dir)
            .with_context(|| format!("creating {}", target_dir.display()))?;
        let to = target_dir.join(name);
        let size = fs::copy(&from, &to)
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;

        Ok(Response::new(request.version).with_metadata("size", size.to_string()))
    }
}

impl Putter<Source, Version, PutParams> for DirResource {
    fn put(
        &self,
        source_dir: &Path,
        request: PutRequest<Source, PutParams>,
    ) -> Result<Response<Version>> {
        let Some(relative) = request.params.file else {
            bail!("params.file is required");
        };
        let relative = inside_build_dir(&relative)?;
        let from = source_dir.join(relative);
        if !from.is_file() {
            bail!("{} is not a file", from.display());
        }
        let name = from
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("{} has no UTF-8 file name", from.display()))?
            .to_string();

        let root = &request.source.root;
        fs::create_dir_all(root).with_context(|| format!("creating {}", root.display()))?;
        let to = root.join(&name);
        if to.exists() {
            bail!("version {name} already exists in {}", root.display());
        }
        let size = fs::copy(&from, &to)
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;

        Ok(Response::new(Version { file: name })
            .with_metadata("size", size.to_string())
            .with_metadata("source", relative.display().to_string()))
    }
}

/// Regular files directly under `root`, sorted by name.
fn list_versions(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("listing {}", root.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Versions name files directly under the root; anything else is rejected.
fn plain_file_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => bail!("invalid version file name {name:?}"),
    }
}

/// Put may only publish files below the build directory.
fn inside_build_dir(path: &Path) -> Result<&Path> {
    let mut components = path.components().peekable();
    let escapes = components.peek().is_none()
        || !components.all(|component| {
            matches!(component, Component::Normal(_) | Component::CurDir)
        });
    if escapes {
        bail!("params.file {} must be relative to the build directory", path.display());
    }
    Ok(path)
}
