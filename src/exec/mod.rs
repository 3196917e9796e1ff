//! Launch step for load-env.
//!
//! This module handles:
//! - Resolving the executable through PATH
//! - Choosing the interactive shell
//! - Running the target with the resolved environment
//! - Rendering `--view` and `--export` output

pub mod render;

use crate::config::Settings;
use crate::error::{LoadEnvError, Result};
use crate::resolve::EnvMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Shell launched when neither settings nor `$SHELL` name one.
pub const DEFAULT_SHELL: &str = "bash";

/// Resolve a command name to its full path.
///
/// Absolute and relative paths (anything with a separator) are returned
/// as-is if they exist. Bare names are searched in PATH.
pub fn resolve_command(command: &str) -> Option<PathBuf> {
	let path = Path::new(command);

	if path.components().count() > 1 || path.is_absolute() {
		return path.is_file().then(|| path.to_path_buf());
	}

	let path_var = std::env::var_os("PATH")?;
	std::env::split_paths(&path_var)
		.map(|dir| dir.join(command))
		.find(|candidate| candidate.is_file())
}

/// The interactive shell to launch: settings, then `$SHELL`, then bash.
pub fn interactive_shell(settings: &Settings, process_env: &EnvMap) -> String {
	settings
		.shell
		.clone()
		.filter(|shell| !shell.is_empty())
		.or_else(|| {
			process_env
				.get("SHELL")
				.filter(|shell| !shell.is_empty())
				.cloned()
		})
		.unwrap_or_else(|| DEFAULT_SHELL.to_string())
}

/// Run `binary` with exactly `env` as its environment.
///
/// `argv0` is what the program sees as its own name. On Unix the current
/// process is replaced, so this only returns on failure. Elsewhere the
/// child is awaited and its exit code returned.
pub fn launch(binary: &Path, argv0: &str, args: &[String], env: &EnvMap) -> Result<i32> {
	let mut cmd = Command::new(binary);
	cmd.args(args)
		.env_clear()
		.envs(env)
		.stdin(Stdio::inherit())
		.stdout(Stdio::inherit())
		.stderr(Stdio::inherit());

	tracing::debug!(binary = %binary.display(), ?args, vars = env.len(), "launching");
	run(cmd, binary, argv0)
}

#[cfg(unix)]
fn run(mut cmd: Command, binary: &Path, argv0: &str) -> Result<i32> {
	use std::os::unix::process::CommandExt;

	let source = cmd.arg0(argv0).exec();
	Err(launch_error(binary, source))
}

#[cfg(not(unix))]
fn run(mut cmd: Command, binary: &Path, _argv0: &str) -> Result<i32> {
	let status = cmd.status().map_err(|source| launch_error(binary, source))?;
	Ok(status.code().unwrap_or(1))
}

/// Map a child's exit code onto a process exit status byte.
///
/// Codes outside `0..=255` report plain failure instead of wrapping.
pub fn exit_status(code: i32) -> u8 {
	u8::try_from(code).unwrap_or(1)
}

fn launch_error(binary: &Path, source: std::io::Error) -> LoadEnvError {
	if source.kind() == std::io::ErrorKind::NotFound {
		LoadEnvError::CommandNotFound {
			command: binary.to_string_lossy().to_string(),
		}
	} else {
		LoadEnvError::CommandFailed {
			command: binary.to_string_lossy().to_string(),
			source,
		}
	}
}
