//! Command runner capability used by command substitution.
//!
//! This module handles:
//! - The `CommandRunner` seam the substitution engine calls through
//! - Spawning real processes with an explicit environment
//! - A scripted runner for tests that never spawns anything

pub mod process;
pub mod scripted;

use crate::resolve::EnvMap;

pub use process::ProcessRunner;
pub use scripted::{RecordedCall, ScriptedRunner};

/// Failure of a single substituted command.
///
/// These never abort resolution; the engine turns them into warnings.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
	#[error("failed to run `{program}`")]
	Spawn {
		program: String,
		#[source]
		source: std::io::Error,
	},

	#[error("`{program}` {}", describe_exit(*code, stderr))]
	NonZeroExit {
		program: String,
		code: Option<i32>,
		/// Captured error output. [`ProcessRunner`] passes stderr through to
		/// the terminal, so only runners that capture it fill this in.
		stderr: String,
	},

	#[error("`{program}` wrote output that is not valid UTF-8")]
	InvalidOutput { program: String },
}

fn describe_exit(code: Option<i32>, stderr: &str) -> String {
	let status = match code {
		Some(code) => format!("exited with status {code}"),
		None => "was terminated by a signal".to_string(),
	};
	let stderr = stderr.trim();
	if stderr.is_empty() {
		status
	} else {
		format!("{status}: {stderr}")
	}
}

/// Runs a program and captures its standard output.
///
/// `env` is the complete environment of the child; nothing else from the
/// current process leaks in.
pub trait CommandRunner {
	fn output(
		&self,
		program: &str,
		args: &[String],
		env: &EnvMap,
	) -> Result<String, CommandError>;
}
