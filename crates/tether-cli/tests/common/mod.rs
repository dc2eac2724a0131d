use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI binary against an API with an isolated credentials file.
pub fn run_cli(args: &[&str], api_url: &str, credentials: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tether"));
    cmd.args(args);
    cmd.env("TETHER_API_URL", api_url);
    cmd.env("TETHER_CREDENTIALS_FILE", credentials);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("TETHER_PASSWORD");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], api_url: &str, credentials: &Path) -> String {
    let output = run_cli(args, api_url, credentials);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}
