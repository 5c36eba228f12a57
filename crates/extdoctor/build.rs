//! Embeds the commit, build date and profile reported by `extdoctor version`

use std::process::Command;

fn main() {
    let today = chrono::Utc::now().format("%Y-%m-%d");
    println!("cargo:rustc-env=EXTDOCTOR_BUILD_DATE={}", today);

    if let Ok(profile) = std::env::var("PROFILE") {
        println!("cargo:rustc-env=EXTDOCTOR_PROFILE={}", profile);
    }

    let commit = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|commit| !commit.is_empty());
    if let Some(commit) = commit {
        println!("cargo:rustc-env=EXTDOCTOR_COMMIT={}", commit);
    }

    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
