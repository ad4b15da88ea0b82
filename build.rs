use std::env;
use std::process::Command;

fn main() {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version = command_output(&rustc, &["--version"]).unwrap_or_else(|| "unknown".into());
    let revision = env::var("PROTOB_GIT_REVISION")
        .ok()
        .or_else(|| command_output("git", &["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| "0000000".into());
    let build_time = chrono::Local::now().format("%Y/%m/%d").to_string();

    println!("cargo:rustc-env=PROTOB_RUSTC_VERSION={rustc_version}");
    println!("cargo:rustc-env=PROTOB_GIT_REVISION={revision}");
    println!("cargo:rustc-env=PROTOB_BUILD_TIME={build_time}");
    println!("cargo:rerun-if-env-changed=PROTOB_GIT_REVISION");
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}
