// Common test utilities

use serde_json::Value;
use std::process::Command;

/// Browser for live tests, from TEST_BROWSER; defaults to chrome
#[allow(dead_code)]
pub fn get_test_browser() -> &'static str {
    match std::env::var("TEST_BROWSER") {
        Ok(browser) if browser == "firefox" => "firefox",
        _ => "chrome",
    }
}

/// Run the CLI; returns stdout, stderr and the exit code
pub fn run_careerprobe(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_careerprobe"))
        .args(args)
        .output()
        .expect("Failed to execute careerprobe command");

    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        output.status.code().unwrap_or(-1),
    )
}

/// First JSON document on stdout
#[allow(dead_code)]
pub fn parse_json(stdout: &str) -> Value {
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| panic!("not JSON ({e}): {stdout}"))
}
