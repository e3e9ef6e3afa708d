use std::path::Path;
use std::process::Command;

/// Embed the commit the binary was built from, shown by `neurofin --version`.
fn main() {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());

    let commit = Command::new("git")
        .arg("-C")
        .arg(&workspace)
        .args(["describe", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_owned())
        .filter(|s| !s.is_empty());

    println!(
        "cargo:rustc-env=NEUROFIN_BUILD_SHA={}",
        commit.as_deref().unwrap_or("dev")
    );
}
