#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A project directory and an isolated config directory.
struct Workspace {
	project: TempDir,
	config: TempDir,
}

impl Workspace {
	fn new() -> Self {
		Self {
			project: tempfile::tempdir().unwrap(),
			config: tempfile::tempdir().unwrap(),
		}
	}

	fn project_file(&self, name: &str, content: &str) -> &Self {
		fs::write(self.project.path().join(name), content).unwrap();
		self
	}

	fn config_file(&self, name: &str, content: &str) -> &Self {
		fs::write(self.config.path().join(name), content).unwrap();
		self
	}

	fn cmd(&self) -> assert_cmd::Command {
		let mut cmd = assert_cmd::Command::cargo_bin("load-env").unwrap();
		cmd.current_dir(self.project.path())
			.env("LOAD_ENV_CONFIG_DIR", self.config.path())
			.env_remove("LOAD_ENV_LOG");
		cmd
	}
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	Workspace::new()
		.cmd()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("Load environment variables"))
		.stdout(predicate::str::contains("gopass show"));
}

#[test]
fn test_version_flag() {
	Workspace::new()
		.cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("load-env"));
}

#[test]
fn test_no_args_shows_help() {
	Workspace::new()
		.cmd()
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_view_and_export_conflict() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "A=1\n");

	ws.cmd()
		.args(["--view", "--export", "dev"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("cannot be used with"));
}

// ============================================================================
// --view tests
// ============================================================================

#[test]
fn test_view_displays_resolved_variables() {
	let ws = Workspace::new();
	ws.project_file(
		"dev.env",
		r#"# database
APP_PORT=8080
API_URL=http://localhost:$APP_PORT
GREETING="Hello \"world\""
LITERAL='kept $APP_PORT'
PRICE=\$100
"#,
	);

	ws.cmd()
		.args(["--view", "dev"])
		.assert()
		.success()
		.stdout(predicate::str::contains("API_URL=\"http://localhost:8080\""))
		.stdout(predicate::str::contains("GREETING=\"Hello \\\"world\\\"\""))
		.stdout(predicate::str::contains("LITERAL=\"kept 8080\""))
		.stdout(predicate::str::contains("PRICE=\"$100\""));
}

#[test]
fn test_view_only_lists_chain_variables() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "ONLY_ME=1\n");

	ws.cmd()
		.args(["--view", "dev"])
		.env("LOAD_ENV_TEST_INHERITED", "nope")
		.assert()
		.success()
		.stdout("ONLY_ME=\"1\"\n");
}

#[test]
fn test_view_rejects_executable() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "A=1\n");

	ws.cmd()
		.args(["--view", "dev", "env"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("--view"));
}

#[test]
fn test_inherited_variables_are_visible() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "GREETING=hi $LOAD_ENV_TEST_NAME\n");

	ws.cmd()
		.args(["--view", "dev"])
		.env("LOAD_ENV_TEST_NAME", "alice")
		.assert()
		.success()
		.stdout(predicate::str::contains("GREETING=\"hi alice\""));
}

// ============================================================================
// File discovery and chain tests
// ============================================================================

#[test]
fn test_falls_back_to_config_dir() {
	let ws = Workspace::new();
	ws.config_file("shared.env", "FROM=config\n");

	ws.cmd()
		.args(["--view", "shared"])
		.assert()
		.success()
		.stdout(predicate::str::contains("FROM=\"config\""));
}

#[test]
fn test_current_directory_wins() {
	let ws = Workspace::new();
	ws.config_file("dev.env", "FROM=config\n");
	ws.project_file("dev.env", "FROM=project\n");

	ws.cmd()
		.args(["--view", "dev"])
		.assert()
		.success()
		.stdout(predicate::str::contains("FROM=\"project\""));
}

#[test]
fn test_missing_env_file_fails() {
	let ws = Workspace::new();

	ws.cmd()
		.args(["--view", "nope"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("nope.env"))
		.stderr(predicate::str::contains("not found"));
}

#[test]
fn test_chain_overrides_and_inherits() {
	let ws = Workspace::new();
	ws.config_file("base.env", "X=1\nY=base\nHOST=db.internal\n");
	ws.project_file("override.env", "X=2\nURL=postgres://$HOST/app\n");

	ws.cmd()
		.args(["--view", "base,override"])
		.assert()
		.success()
		.stdout(predicate::str::contains("X=\"2\""))
		.stdout(predicate::str::contains("Y=\"base\""))
		.stdout(predicate::str::contains("URL=\"postgres://db.internal/app\""));
}

#[test]
fn test_chain_with_missing_member_fails() {
	let ws = Workspace::new();
	ws.project_file("base.env", "X=1\n");

	ws.cmd()
		.args(["--view", "base,missing"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("missing.env"));
}

// ============================================================================
// Warning tests
// ============================================================================

#[test]
fn test_malformed_line_warns_and_continues() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "A=1\nthis line is broken\nB=2\n");

	ws.cmd()
		.args(["--view", "dev"])
		.assert()
		.success()
		.stdout("A=\"1\"\nB=\"2\"\n")
		.stderr(predicate::str::contains("load-env: Warning:"))
		.stderr(predicate::str::contains("line 2"));
}

#[cfg(unix)]
#[test]
fn test_failed_command_warns_and_empties_value() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "BROKEN=$[exit 3]\nOK=fine\n");

	ws.cmd()
		.args(["--view", "dev"])
		.assert()
		.success()
		.stdout(predicate::str::contains("BROKEN=\"\""))
		.stdout(predicate::str::contains("OK=\"fine\""))
		.stderr(predicate::str::contains("load-env: Warning:"))
		.stderr(predicate::str::contains("BROKEN"));
}

// ============================================================================
// Command substitution tests (Unix only - these use a POSIX shell)
// ============================================================================

#[cfg(unix)]
#[test]
fn test_command_substitution_forms() {
	let ws = Workspace::new();
	ws.project_file(
		"dev.env",
		"NAME=world\nPAREN=$(echo hello)\nBRACKET=$[echo \"(nested)\" | tr -d '()']\nFROM_ENV=$(echo $NAME)\n",
	);

	ws.cmd()
		.args(["--view", "dev"])
		.assert()
		.success()
		.stdout(predicate::str::contains("PAREN=\"hello\""))
		.stdout(predicate::str::contains("BRACKET=\"nested\""))
		.stdout(predicate::str::contains("FROM_ENV=\"world\""));
}

#[cfg(unix)]
#[test]
fn test_command_sees_earlier_variables_in_environment() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "SECRET_DIR=/vault\nSEEN=$[printenv SECRET_DIR]\n");

	ws.cmd()
		.args(["--view", "dev"])
		.assert()
		.success()
		.stdout(predicate::str::contains("SEEN=\"/vault\""));
}

#[cfg(unix)]
#[test]
fn test_secret_lookup_uses_configured_tool() {
	use std::os::unix::fs::PermissionsExt;

	let ws = Workspace::new();
	let tool = ws.config.path().join("fake-secrets");
	fs::write(&tool, "#!/bin/sh\necho \"secret-for-$3 ($1 $2)\"\n").unwrap();
	fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

	ws.config_file(
		"config.toml",
		&format!("secret-tool = \"{}\"\n", tool.to_string_lossy()),
	);
	ws.project_file(
		"dev.env",
		&format!("DB_PASS=$({} show -o db/pass)\n", tool.to_string_lossy()),
	);

	ws.cmd()
		.args(["--view", "dev"])
		.assert()
		.success()
		.stdout(predicate::str::contains(
			"DB_PASS=\"secret-for-db/pass (show --password)\"",
		));
}

#[test]
fn test_invalid_settings_file_fails() {
	let ws = Workspace::new();
	ws.config_file("config.toml", "sandbox = [[[\n");
	ws.project_file("dev.env", "A=1\n");

	ws.cmd()
		.args(["--view", "dev"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("settings"));
}

// ============================================================================
// --export tests
// ============================================================================

#[test]
fn test_export_prints_quoted_statements() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "A=it's\nB=\\$HOME\n");

	ws.cmd()
		.args(["--export", "dev"])
		.assert()
		.success()
		.stdout("export A='it'\\''s'\nexport B='$HOME'\n");
}

#[test]
fn test_export_rejects_executable() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "A=1\n");

	ws.cmd()
		.args(["--export", "dev", "echo", "hi"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("Did you mean"));
}

#[cfg(unix)]
#[test]
fn test_export_output_evaluates_in_shell() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "TRICKY='a \"b\" \\$c `d`'\n");

	let output = ws.cmd().args(["--export", "dev"]).output().unwrap();
	assert!(output.status.success());
	let script = format!(
		"{}printf '%s' \"$TRICKY\"",
		String::from_utf8(output.stdout).unwrap()
	);

	let evaluated = std::process::Command::new("sh")
		.args(["-c", &script])
		.output()
		.unwrap();
	assert_eq!(
		String::from_utf8(evaluated.stdout).unwrap(),
		"a \"b\" $c `d`"
	);
}

// ============================================================================
// Launch tests (Unix only - these run Unix commands)
// ============================================================================

#[cfg(unix)]
#[test]
fn test_runs_executable_with_variables() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "GREETING=hello\n");

	ws.cmd()
		.args(["dev", "sh", "-c", "echo $GREETING world"])
		.assert()
		.success()
		.stdout(predicate::str::contains("hello world"));
}

#[cfg(unix)]
#[test]
fn test_exit_code_propagates() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "A=1\n");

	ws.cmd().args(["dev", "sh", "-c", "exit 42"]).assert().code(42);
}

#[cfg(unix)]
#[test]
fn test_default_mode_keeps_process_environment() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "FROM_FILE=1\n");

	ws.cmd()
		.args(["dev", "sh", "-c", "echo \"$FROM_FILE:$LOAD_ENV_TEST_OUTER\""])
		.env("LOAD_ENV_TEST_OUTER", "outer")
		.assert()
		.success()
		.stdout("1:outer\n");
}

#[cfg(unix)]
#[test]
fn test_sandbox_drops_process_environment() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "FROM_FILE=1\n");

	ws.cmd()
		.args(["--sandbox", "dev", "env"])
		.env("LOAD_ENV_TEST_OUTER", "outer")
		.assert()
		.success()
		.stdout("FROM_FILE=1\n");
}

#[cfg(unix)]
#[test]
fn test_sandbox_from_settings() {
	let ws = Workspace::new();
	ws.config_file("config.toml", "sandbox = true\n");
	ws.project_file("dev.env", "FROM_FILE=1\n");

	ws.cmd()
		.args(["dev", "env"])
		.env("LOAD_ENV_TEST_OUTER", "outer")
		.assert()
		.success()
		.stdout(predicate::str::contains("LOAD_ENV_TEST_OUTER").not());
}

#[test]
fn test_executable_not_found() {
	let ws = Workspace::new();
	ws.project_file("dev.env", "A=1\n");

	ws.cmd()
		.args(["dev", "load_env_nonexistent_command_12345"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("not found"));
}

#[cfg(unix)]
#[test]
fn test_subshell_uses_configured_shell() {
	let ws = Workspace::new();
	ws.config_file("config.toml", "shell = \"sh\"\n");
	ws.project_file("dev.env", "GREETING=from-subshell\n");

	ws.cmd()
		.arg("dev")
		.write_stdin("echo $GREETING\nexit 0\n")
		.assert()
		.success()
		.stdout(predicate::str::contains("from-subshell"))
		.stderr(predicate::str::contains("Launching new 'sh' subshell"));
}
