use crate::resolve::EnvMap;
use crate::runner::{CommandError, CommandRunner};
use std::process::{Command, Stdio};

/// Runs substituted commands as real child processes.
///
/// The child's stderr is passed straight through so prompts and error output
/// from tools like `gopass` stay visible. Stdin is inherited for the same
/// reason.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
	fn output(
		&self,
		program: &str,
		args: &[String],
		env: &EnvMap,
	) -> Result<String, CommandError> {
		tracing::debug!(program, ?args, "running substituted command");

		let mut cmd = Command::new(program);
		cmd.args(args)
			.env_clear()
			.envs(env)
			.stdin(Stdio::inherit())
			.stdout(Stdio::piped())
			.stderr(Stdio::inherit());

		let output = cmd.output().map_err(|source| CommandError::Spawn {
			program: program.to_string(),
			source,
		})?;

		if !output.status.success() {
			return Err(CommandError::NonZeroExit {
				program: program.to_string(),
				code: output.status.code(),
				stderr: String::new(),
			});
		}

		String::from_utf8(output.stdout).map_err(|_| CommandError::InvalidOutput {
			program: program.to_string(),
		})
	}
}
