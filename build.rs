use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=RESOURCE_INSTALL_ROOT_HINT");

    let Some(raw_hint) = env::var("RESOURCE_INSTALL_ROOT_HINT")
        .ok()
        .filter(|hint| !hint.trim().is_empty())
    else {
        return;
    };

    // Relative hints would resolve against whatever directory the plugin
    // happens to run from, so only absolute roots are baked in.
    let candidate = PathBuf::from(raw_hint);
    if candidate.is_absolute() {
        println!(
            "cargo:rustc-env=RESOURCE_INSTALL_ROOT_HINT={}",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=ignoring relative RESOURCE_INSTALL_ROOT_HINT {}",
            candidate.display()
        );
    }
}
