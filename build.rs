use std::process::Command;

/// Short hash of the commit being built, if this is a git checkout
fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    (!described.is_empty()).then(|| described.to_string())
}

fn main() {
    let built_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let revision = describe_head().unwrap_or_else(|| "unknown".to_string());

    // Consumed by `cli::long_version`
    println!("cargo:rustc-env=TREE_HISTORY_BUILD_TIMESTAMP={built_at}");
    println!("cargo:rustc-env=TREE_HISTORY_GIT_REVISION={revision}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
