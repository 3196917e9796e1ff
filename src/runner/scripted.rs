use crate::resolve::EnvMap;
use crate::runner::{CommandError, CommandRunner};
use std::cell::RefCell;
use std::collections::HashMap;

/// A call received by a [`ScriptedRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
	pub program: String,
	pub args: Vec<String>,
	pub env: EnvMap,
}

impl RecordedCall {
	/// The program and its arguments joined by single spaces.
	pub fn command_line(&self) -> String {
		command_line(&self.program, &self.args)
	}
}

#[derive(Debug, Clone)]
enum Reply {
	Stdout(String),
	Exit { code: i32, stderr: String },
}

/// Test double for [`CommandRunner`] that answers from a script instead of
/// spawning processes.
///
/// Replies are keyed by the full command line (program and arguments joined
/// by single spaces). Unscripted commands fail with exit status 127, like a
/// shell that cannot find the program.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
	replies: HashMap<String, Reply>,
	calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedRunner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reply to `command_line` with a successful exit and the given stdout.
	pub fn with_stdout(mut self, command_line: &str, stdout: &str) -> Self {
		self.replies
			.insert(command_line.to_string(), Reply::Stdout(stdout.to_string()));
		self
	}

	/// Reply to `command_line` with a non-zero exit.
	pub fn with_failure(mut self, command_line: &str, code: i32, stderr: &str) -> Self {
		self.replies.insert(
			command_line.to_string(),
			Reply::Exit {
				code,
				stderr: stderr.to_string(),
			},
		);
		self
	}

	/// Every call received so far, in order.
	pub fn calls(&self) -> Vec<RecordedCall> {
		self.calls.borrow().clone()
	}
}

impl CommandRunner for ScriptedRunner {
	fn output(
		&self,
		program: &str,
		args: &[String],
		env: &EnvMap,
	) -> Result<String, CommandError> {
		let line = command_line(program, args);
		self.calls.borrow_mut().push(RecordedCall {
			program: program.to_string(),
			args: args.to_vec(),
			env: env.clone(),
		});

		match self.replies.get(&line) {
			Some(Reply::Stdout(stdout)) => Ok(stdout.clone()),
			Some(Reply::Exit { code, stderr }) => Err(CommandError::NonZeroExit {
				program: program.to_string(),
				code: Some(*code),
				stderr: stderr.clone(),
			}),
			None => Err(CommandError::NonZeroExit {
				program: program.to_string(),
				code: Some(127),
				stderr: format!("no scripted reply for `{line}`"),
			}),
		}
	}
}

fn command_line(program: &str, args: &[String]) -> String {
	std::iter::once(program)
		.chain(args.iter().map(String::as_str))
		.collect::<Vec<_>>()
		.join(" ")
}
