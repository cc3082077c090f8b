//! Build script for input-humanizer
//!
//! Stamps the binary with build date, time and commit for the startup banner.

use std::process::Command;

fn command_output(program: &str, args: &[&str], fallback: &str) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn main() {
    let stamps = [
        ("BUILD_DATE", command_output("date", &["+%Y-%m-%d"], "unknown")),
        ("BUILD_TIME", command_output("date", &["+%H:%M:%S"], "")),
        (
            "GIT_HASH",
            command_output("git", &["rev-parse", "--short", "HEAD"], "unknown"),
        ),
    ];

    for (name, value) in stamps {
        println!("cargo:rustc-env={}={}", name, value);
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
}
