use std::env;
use std::process::Command;

/// Trimmed stdout of a successful git invocation
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let out = String::from_utf8(output.stdout).ok()?;
    Some(out.trim().to_string()).filter(|s| !s.is_empty())
}

fn var_or_unknown(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| "unknown".to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=CI_BUILD_REF");

    let repo_version = env::var("CI_BUILD_REF")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| git(&["describe", "--always", "--dirty", "--tags"]))
        .unwrap_or_else(|| var_or_unknown("CARGO_PKG_VERSION"));

    println!("cargo:rustc-env=REPO_VERSION={}", repo_version);
    println!("cargo:rustc-env=BUILD_PROFILE={}", var_or_unknown("PROFILE"));
    println!("cargo:rustc-env=BUILD_TARGET={}", var_or_unknown("TARGET"));
    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        chrono::Utc::now().to_rfc3339()
    );
}
