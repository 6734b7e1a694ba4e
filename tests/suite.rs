#![cfg(unix)]

// End-to-end suite: installs the dir-resource demo plugin into a sandboxed
// root and drives every entry point through real process invocations.
mod support;

use anyhow::Result;
use serde_json::{Value, json};
use std::fs;
use support::{Sandbox, plugin_binary, run_with_stdin, stderr_of};

fn check_input(sandbox: &Sandbox, version: Value) -> String {
    json!({
        "source": {"root": sandbox.store()},
        "version": version,
    })
    .to_string()
}

#[test]
fn install_links_every_entry_point_to_the_binary() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let output = sandbox.install()?;
    assert!(output.stdout.is_empty(), "install must not write to stdout");

    for name in ["check", "in", "out"] {
        let entry = sandbox.entry_point(name);
        assert!(
            fs::symlink_metadata(&entry)?.file_type().is_symlink(),
            "{} is not a symlink",
            entry.display()
        );
        assert_eq!(fs::read_link(&entry)?, plugin_binary());
    }
    Ok(())
}

#[test]
fn check_reports_latest_version_on_first_run() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install()?;
    sandbox.add_version("v1")?;
    sandbox.add_version("v2")?;

    let output = run_with_stdin(
        sandbox.command(&sandbox.entry_point("check")),
        &check_input(&sandbox, Value::Null),
    )?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(String::from_utf8(output.stdout)?, "[{\"file\":\"v2\"}]\n");
    Ok(())
}

#[test]
fn check_reports_versions_from_the_known_one() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install()?;
    for name in ["v1", "v2", "v3"] {
        sandbox.add_version(name)?;
    }

    let output = run_with_stdin(
        sandbox.command(&sandbox.entry_point("check")),
        &check_input(&sandbox, json!({"file": "v2"})),
    )?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let versions: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(versions, json!([{"file": "v2"}, {"file": "v3"}]));
    Ok(())
}

#[test]
fn in_copies_version_into_target_directory() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install()?;
    sandbox.add_version("v1")?;
    let target = sandbox.build().join("fetched");

    let mut cmd = sandbox.command(&sandbox.entry_point("in"));
    cmd.arg(&target);
    let input = json!({
        "source": {"root": sandbox.store()},
        "version": {"file": "v1"},
        "params": {},
    });
    let output = run_with_stdin(cmd, &input.to_string())?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let response: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        response,
        json!({
            "version": {"file": "v1"},
            "metadata": [{"name": "size", "value": "2"}],
        })
    );
    assert_eq!(fs::read_to_string(target.join("v1"))?, "v1");
    Ok(())
}

#[test]
fn out_publishes_file_from_source_directory() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install()?;
    fs::create_dir_all(sandbox.build().join("dist"))?;
    fs::write(sandbox.build().join("dist/release-1.tgz"), b"payload")?;

    let mut cmd = sandbox.command(&sandbox.entry_point("out"));
    cmd.arg(sandbox.build());
    let input = json!({
        "source": {"root": sandbox.store()},
        "params": {"file": "dist/release-1.tgz"},
    });
    let output = run_with_stdin(cmd, &input.to_string())?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let response: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(response["version"], json!({"file": "release-1.tgz"}));
    assert_eq!(
        response["metadata"],
        json!([
            {"name": "size", "value": "7"},
            {"name": "source", "value": "dist/release-1.tgz"},
        ])
    );
    assert_eq!(fs::read(sandbox.store().join("release-1.tgz"))?, b"payload");
    Ok(())
}

#[test]
fn unknown_request_field_fails_without_output() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install()?;
    sandbox.add_version("v1")?;

    let input = json!({
        "source": {"root": sandbox.store()},
        "version": null,
        "unexpected": true,
    });
    let output = run_with_stdin(
        sandbox.command(&sandbox.entry_point("check")),
        &input.to_string(),
    )?;
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("could not decode source") && stderr.contains("unexpected"),
        "stderr: {stderr}"
    );
    Ok(())
}

#[test]
fn capability_failure_names_the_verb() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install()?;

    let mut cmd = sandbox.command(&sandbox.entry_point("in"));
    cmd.arg(sandbox.build());
    let input = json!({
        "source": {"root": sandbox.store()},
        "version": {"file": "missing"},
    });
    let output = run_with_stdin(cmd, &input.to_string())?;
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("get failed: version missing not found"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn in_without_target_directory_is_rejected() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install()?;
    sandbox.add_version("v1")?;

    let input = json!({
        "source": {"root": sandbox.store()},
        "version": {"file": "v1"},
    });
    let output = run_with_stdin(
        sandbox.command(&sandbox.entry_point("in")),
        &input.to_string(),
    )?;
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("missing target directory argument for get"));
    Ok(())
}

#[test]
fn install_rejects_other_commands() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let mut cmd = sandbox.command(&plugin_binary());
    cmd.arg("deploy");
    let output = cmd.output()?;

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("unrecognized arguments"), "stderr: {stderr}");
    assert!(stderr.contains("deploy"), "stderr: {stderr}");
    assert!(!sandbox.install_root().exists());
    Ok(())
}

#[test]
fn install_refuses_symlinked_binary() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let alias = sandbox.alias("plugin-alias")?;

    let mut cmd = sandbox.command(&alias);
    cmd.arg("install");
    let output = cmd.output()?;

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("must not be a symbolic link"), "stderr: {stderr}");
    assert!(!sandbox.install_root().exists());
    Ok(())
}

#[test]
fn second_install_reports_existing_link() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install()?;

    let mut cmd = sandbox.command(&plugin_binary());
    cmd.arg("install");
    let output = cmd.output()?;

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    let expected = format!("could not create {} link", sandbox.entry_point("check").display());
    assert!(stderr.contains(&expected), "stderr: {stderr}");
    // The existing links are left untouched.
    assert_eq!(fs::read_link(sandbox.entry_point("out"))?, plugin_binary());
    Ok(())
}
