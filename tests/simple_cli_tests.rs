use assert_cmd::prelude::*;
use assert_cmd::cargo::cargo_bin_cmd;

/// Tests that `--help` is handled successfully by the CLI.
///
/// This test verifies:
/// 1. Running `revisit-cli --help` exits successfully
/// 2. The help text lists the top-level commands
/// 3. No unexpected stderr output is produced
#[test]
fn test_cli_help_success() {
  let mut cmd = cargo_bin_cmd!("revisit-cli");

  let assert = cmd.arg("--help").assert().success();

  let out = assert.get_output();
  let stdout = String::from_utf8_lossy(&out.stdout);
  println!("=== revisit-cli --help stdout ===\n\n{}\n=================================", stdout);

  for command in ["pattern", "category", "box", "item", "review", "today"] {
  	assert!(stdout.contains(command), "expected `{}` in --help output", command);
  }
  assert!(
  	out.stderr.is_empty(),
  	"expected empty stderr for --help, got:\n{}",
  	String::from_utf8_lossy(&out.stderr)
  );
}

/// Tests that a bad reschedule policy is rejected before anything is sent.
#[test]
fn test_cli_rejects_unknown_policy() {
  let mut cmd = cargo_bin_cmd!("revisit-cli");

  let assert = cmd
  	.args(["review", "reschedule", "item-1", "rd-1", "--date", "2024-06-10", "--policy", "sideways"])
  	.assert()
  	.failure();

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
  assert!(stderr.contains("sideways"), "unexpected stderr:\n{}", stderr);
}

/// Tests that an unreachable server produces the connection hint and a
/// non-zero exit code.
#[test]
fn test_cli_reports_unreachable_server() {
  let mut cmd = cargo_bin_cmd!("revisit-cli");

  let assert = cmd
  	.args(["--server-url", "http://127.0.0.1:9", "--timeout-secs", "2", "pattern", "list"])
  	.env_remove("REVISIT_URL")
  	.assert()
  	.failure();

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
  assert!(stderr.contains("Error:"), "unexpected stderr:\n{}", stderr);
}

/// Tests that configuration resolution is logged with `--debug`.
#[test]
fn test_cli_logs_resolved_config() {
  let mut cmd = cargo_bin_cmd!("revisit-cli");

  let assert = cmd
  	.args(["--debug", "--server-url", "http://127.0.0.1:9", "--timeout-secs", "2", "pattern", "list"])
  	.env_remove("REVISIT_URL")
  	.assert()
  	.failure();

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
  assert!(stderr.contains("Final configuration"), "unexpected stderr:\n{}", stderr);
  assert!(stderr.contains("http://127.0.0.1:9"), "unexpected stderr:\n{}", stderr);
}
