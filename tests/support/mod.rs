use anyhow::{Context, Result, bail};
use resource_runner::INSTALL_ROOT_ENV;
use std::io::Write;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// The demo plugin built alongside the tests.
pub fn plugin_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dir-resource"))
}

/// Scratch layout for one test: an install root, a version store, and a
/// build directory handed to `in`/`out`.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("failed to allocate sandbox")?;
        for sub in ["store", "build"] {
            std::fs::create_dir_all(dir.path().join(sub))?;
        }
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn install_root(&self) -> PathBuf {
        self.path().join("opt/resource")
    }

    pub fn entry_point(&self, name: &str) -> PathBuf {
        self.install_root().join(name)
    }

    pub fn store(&self) -> PathBuf {
        self.path().join("store")
    }

    pub fn build(&self) -> PathBuf {
        self.path().join("build")
    }

    pub fn add_version(&self, name: &str) -> Result<()> {
        std::fs::write(self.store().join(name), name.as_bytes())
            .with_context(|| format!("failed to seed version {name}"))
    }

    /// Command for `program` with the install root pointed into the sandbox.
    pub fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.env(INSTALL_ROOT_ENV, self.install_root());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Run the plugin's install flow from the real binary.
    pub fn install(&self) -> Result<Output> {
        let mut cmd = self.command(&plugin_binary());
        cmd.arg("install");
        run_command(cmd)
    }

    /// Link `alias` to the plugin binary inside the sandbox.
    pub fn alias(&self, alias: &str) -> Result<PathBuf> {
        let path = self.path().join(alias);
        symlink(plugin_binary(), &path)?;
        Ok(path)
    }
}

/// Spawn `cmd`, feed `input` on stdin and collect its output.
pub fn run_with_stdin(mut cmd: Command, input: &str) -> Result<Output> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to spawn {:?}", cmd))?;
    child
        .stdin
        .take()
        .context("stdin not captured")?
        .write_all(input.as_bytes())?;
    child
        .wait_with_output()
        .with_context(|| format!("failed to wait for {:?}", cmd))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
