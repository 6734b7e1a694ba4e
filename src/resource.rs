//! The capability set and its single-shot dispatcher.
//!
//! A [`ResourceType`] is assembled once at startup from whichever capabilities
//! the plugin implements, then [`ResourceType::run`] performs exactly one flow:
//! a check/get/put request-response cycle over the configured streams, or the
//! install flow when invoked under any other name.

use crate::capability::{Checker, Getter, Putter};
use crate::entry_points::{EntryPoints, Invocation, Verb, clean};
use crate::error::ResourceError;
use crate::install;
use crate::install_root_from_env;
use crate::models::{CheckRequest, GetRequest, PutRequest};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::env;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const DISPATCH_TARGET: &str = "resource_runner::dispatch";

/// Capability set for one plugin invocation.
///
/// `S`, `V`, `G` and `P` are the plugin's source, version, get-params and
/// put-params types. The lifetime lets tests hand in borrowed streams and
/// borrowed capability stubs.
pub struct ResourceType<'a, S, V, G, P> {
    stdin: Box<dyn Read + 'a>,
    stdout: Box<dyn Write + 'a>,
    entry_points: EntryPoints,
    check: Option<Box<dyn Checker<S, V> + 'a>>,
    get: Option<Box<dyn Getter<S, V, G> + 'a>>,
    put: Option<Box<dyn Putter<S, V, P> + 'a>>,
}

impl<'a, S, V, G, P> Default for ResourceType<'a, S, V, G, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S, V, G, P> ResourceType<'a, S, V, G, P> {
    /// Empty capability set on process stdin/stdout, rooted at the install
    /// root from [`install_root_from_env`].
    pub fn new() -> Self {
        Self {
            stdin: Box::new(io::stdin()),
            stdout: Box::new(io::stdout()),
            entry_points: EntryPoints::new(install_root_from_env()),
            check: None,
            get: None,
            put: None,
        }
    }

    pub fn with_checker(mut self, checker: impl Checker<S, V> + 'a) -> Self {
        self.check = Some(Box::new(checker));
        self
    }

    pub fn with_getter(mut self, getter: impl Getter<S, V, G> + 'a) -> Self {
        self.get = Some(Box::new(getter));
        self
    }

    pub fn with_putter(mut self, putter: impl Putter<S, V, P> + 'a) -> Self {
        self.put = Some(Box::new(putter));
        self
    }

    pub fn with_stdin(mut self, stdin: impl Read + 'a) -> Self {
        self.stdin = Box::new(stdin);
        self
    }

    pub fn with_stdout(mut self, stdout: impl Write + 'a) -> Self {
        self.stdout = Box::new(stdout);
        self
    }

    /// Override the directory holding the `check`/`in`/`out` entry points.
    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.entry_points = EntryPoints::new(root);
        self
    }

    /// Verbs present in this capability set, in check/get/put order.
    pub fn implemented(&self) -> Vec<Verb> {
        Verb::ALL
            .into_iter()
            .filter(|verb| match verb {
                Verb::Check => self.check.is_some(),
                Verb::Get => self.get.is_some(),
                Verb::Put => self.put.is_some(),
            })
            .collect()
    }
}

impl<'a, S, V, G, P> ResourceType<'a, S, V, G, P>
where
    S: DeserializeOwned,
    V: DeserializeOwned + Serialize,
    G: DeserializeOwned + Default,
    P: DeserializeOwned + Default,
{
    /// Dispatch on the real process arguments.
    pub fn run_with_process_args(self) -> Result<(), ResourceError> {
        self.run(&[])
    }

    /// Classify `args[0]` and run the selected flow to completion.
    ///
    /// An empty `args` stands for the real process arguments.
    pub fn run(self, args: &[String]) -> Result<(), ResourceError> {
        if args.is_empty() {
            let process_args: Vec<String> = env::args().collect();
            return self.dispatch(&process_args);
        }
        self.dispatch(args)
    }

    fn dispatch(mut self, args: &[String]) -> Result<(), ResourceError> {
        let bin_path = binary_path(args)?;
        let invocation = self.entry_points.classify(&bin_path);
        debug!(
            target: DISPATCH_TARGET,
            binary = %bin_path.display(),
            ?invocation,
            "classified invocation"
        );

        match invocation {
            Invocation::Verb(Verb::Check) => self.run_check(),
            Invocation::Verb(Verb::Get) => self.run_get(args),
            Invocation::Verb(Verb::Put) => self.run_put(args),
            Invocation::Install => {
                let implemented = self.implemented();
                install::install(&bin_path, args, &self.entry_points, &implemented).map(drop)
            }
        }
    }

    fn run_check(&mut self) -> Result<(), ResourceError> {
        let Some(checker) = self.check.as_ref() else {
            return Err(self.not_implemented(Verb::Check));
        };
        let request: CheckRequest<S, V> = decode(&mut self.stdin, Verb::Check)?;
        let versions = checker
            .check(request)
            .map_err(|source| ResourceError::Capability {
                verb: Verb::Check,
                source,
            })?;
        debug!(target: DISPATCH_TARGET, count = versions.len(), "check returned versions");
        encode(&mut self.stdout, Verb::Check, &versions)
    }

    fn run_get(&mut self, args: &[String]) -> Result<(), ResourceError> {
        let Some(getter) = self.get.as_ref() else {
            return Err(self.not_implemented(Verb::Get));
        };
        let request: GetRequest<S, V, G> = decode(&mut self.stdin, Verb::Get)?;
        let target_dir = working_dir(args, Verb::Get)?;
        let response = getter
            .get(target_dir, request)
            .map_err(|source| ResourceError::Capability {
                verb: Verb::Get,
                source,
            })?;
        encode(&mut self.stdout, Verb::Get, &response)
    }

    fn run_put(&mut self, args: &[String]) -> Result<(), ResourceError> {
        let Some(putter) = self.put.as_ref() else {
            return Err(self.not_implemented(Verb::Put));
        };
        let request: PutRequest<S, P> = decode(&mut self.stdin, Verb::Put)?;
        let source_dir = working_dir(args, Verb::Put)?;
        let response = putter
            .put(source_dir, request)
            .map_err(|source| ResourceError::Capability {
                verb: Verb::Put,
                source,
            })?;
        encode(&mut self.stdout, Verb::Put, &response)
    }

    fn not_implemented(&self, verb: Verb) -> ResourceError {
        ResourceError::NotImplemented {
            entry_point: self.entry_points.path(verb),
        }
    }
}

fn binary_path(args: &[String]) -> Result<PathBuf, ResourceError> {
    let Some(arg0) = args.first() else {
        return Err(ResourceError::BinaryPath {
            path: PathBuf::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "argument list is empty"),
        });
    };
    std::path::absolute(arg0)
        .map(|path| clean(&path))
        .map_err(|source| ResourceError::BinaryPath {
            path: PathBuf::from(arg0),
            source,
        })
}

fn working_dir(args: &[String], verb: Verb) -> Result<&Path, ResourceError> {
    args.get(1)
        .map(Path::new)
        .ok_or(ResourceError::MissingTargetDirectory { verb })
}

/// Decode the first JSON value on `reader`; anything after it is ignored.
fn decode<T: DeserializeOwned>(reader: &mut dyn Read, verb: Verb) -> Result<T, ResourceError> {
    let mut stream = serde_json::Deserializer::from_reader(reader).into_iter::<T>();
    match stream.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(source)) => Err(ResourceError::Decode { verb, source }),
        None => Err(ResourceError::Decode {
            verb,
            source: serde::de::Error::custom("no request document on stdin"),
        }),
    }
}

/// Serialize fully before writing so a failed encode never leaves partial
/// JSON on the output stream.
fn encode<T: Serialize>(
    writer: &mut dyn Write,
    verb: Verb,
    value: &T,
) -> Result<(), ResourceError> {
    let mut document =
        serde_json::to_vec(value).map_err(|source| ResourceError::Encode { verb, source })?;
    document.push(b'\n');
    writer
        .write_all(&document)
        .and_then(|()| writer.flush())
        .map_err(|source| ResourceError::Write { verb, source })
}
