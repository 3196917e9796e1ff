use crate::error::{LoadEnvError, Result};
use crate::resolve::diagnostics::Diagnostics;
use crate::resolve::scope::EnvMap;
use crate::runner::CommandRunner;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

/// `$NAME` or `${NAME}`.
static VARIABLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\$(?:([A-Za-z_][A-Za-z0-9_]*)|\{([A-Za-z_][A-Za-z0-9_]*)\})")
		.expect("variable reference pattern is valid")
});

/// `$[COMMAND]`, bounded by the first `]`.
static BRACKET_COMMAND: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\$\[([^\]]*)\]").expect("bracket command pattern is valid"));

/// `$(COMMAND)`, bounded by the first `)`.
static PAREN_COMMAND: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\$\(([^)]*)\)").expect("paren command pattern is valid"));

/// Programs used by the command-substitution passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionOptions {
	/// Secret store CLI recognized by `$(<tool> show PATH)`.
	pub secret_tool: String,

	/// Interpreter invoked as `<shell> -c COMMAND` for `$[...]` and `$(...)`.
	pub command_shell: String,
}

impl Default for SubstitutionOptions {
	fn default() -> Self {
		Self {
			secret_tool: "gopass".to_string(),
			command_shell: "sh".to_string(),
		}
	}
}

/// Location of the value being substituted, for warnings.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
	pub source: &'a Path,
	pub line_number: usize,
	pub key: &'a str,
}

/// Applies the substitution passes to single values.
pub struct Substitutor<'a> {
	runner: &'a dyn CommandRunner,
	diagnostics: &'a dyn Diagnostics,
	secret_tool: String,
	command_shell: String,
	secret_pattern: Regex,
}

impl<'a> Substitutor<'a> {
	pub fn new(
		runner: &'a dyn CommandRunner,
		diagnostics: &'a dyn Diagnostics,
		options: &SubstitutionOptions,
	) -> Result<Self> {
		let pattern = format!(
			r"\$\(\s*{}(?:\s+([^)]*))?\)",
			regex::escape(&options.secret_tool)
		);
		let secret_pattern =
			Regex::new(&pattern).map_err(|source| LoadEnvError::InvalidPattern {
				pattern: pattern.clone(),
				source,
			})?;

		Ok(Self {
			runner,
			diagnostics,
			secret_tool: options.secret_tool.clone(),
			command_shell: options.command_shell.clone(),
			secret_pattern,
		})
	}

	/// Resolve one value against `scope`.
	///
	/// Passes run in a fixed order, each on the previous pass's output:
	/// variable references, secret lookups, `$[...]`, then `$(...)`.
	/// `scope` is both the lookup scope and the environment of every
	/// substituted command.
	pub fn substitute(&self, value: &str, scope: &EnvMap, ctx: LineContext<'_>) -> String {
		let value = expand_variables(value, scope);
		let value = self.substitute_secrets(&value, scope, ctx);
		let value = self.substitute_brackets(&value, scope, ctx);
		self.substitute_parens(&value, scope, ctx)
	}

	/// Replace `$(<secret-tool> [show] PATH [flags])` with the secret at PATH.
	///
	/// Whatever form was written, the tool is invoked as
	/// `<secret-tool> show --password PATH`.
	pub fn substitute_secrets(&self, value: &str, scope: &EnvMap, ctx: LineContext<'_>) -> String {
		self.secret_pattern
			.replace_all(value, |caps: &Captures<'_>| {
				let spec = caps.get(1).map_or("", |m| m.as_str());
				let Some(path) = secret_path(spec) else {
					self.diagnostics.warn(&format!(
						"{} command for variable '{}' on line {} in '{}' names no secret path. Value set to empty.",
						self.secret_tool,
						ctx.key,
						ctx.line_number,
						ctx.source.display()
					));
					return String::new();
				};

				let args = vec![
					"show".to_string(),
					"--password".to_string(),
					path.to_string(),
				];
				let what = format!("{} command (path: '{path}')", self.secret_tool);
				self.capture(&self.secret_tool, &args, scope, ctx, &what)
			})
			.into_owned()
	}

	/// Replace `$[COMMAND]` with the command's output.
	pub fn substitute_brackets(&self, value: &str, scope: &EnvMap, ctx: LineContext<'_>) -> String {
		self.substitute_shell(&BRACKET_COMMAND, value, scope, ctx)
	}

	/// Replace `$(COMMAND)` with the command's output.
	pub fn substitute_parens(&self, value: &str, scope: &EnvMap, ctx: LineContext<'_>) -> String {
		self.substitute_shell(&PAREN_COMMAND, value, scope, ctx)
	}

	fn substitute_shell(
		&self,
		pattern: &Regex,
		value: &str,
		scope: &EnvMap,
		ctx: LineContext<'_>,
	) -> String {
		pattern
			.replace_all(value, |caps: &Captures<'_>| {
				let command = &caps[1];
				let args = vec!["-c".to_string(), command.to_string()];
				let what = format!("Command '{command}'");
				self.capture(&self.command_shell, &args, scope, ctx, &what)
			})
			.into_owned()
	}

	/// Run a substituted command and turn its stdout into a value.
	///
	/// Failures and empty output become an empty string plus a warning.
	fn capture(
		&self,
		program: &str,
		args: &[String],
		scope: &EnvMap,
		ctx: LineContext<'_>,
		what: &str,
	) -> String {
		match self.runner.output(program, args, scope) {
			Ok(stdout) => {
				let stdout = stdout.strip_suffix('\n').unwrap_or(&stdout);
				if stdout.is_empty() {
					self.diagnostics.warn(&format!(
						"{what} for variable '{}' returned an empty value on line {} in '{}'.",
						ctx.key,
						ctx.line_number,
						ctx.source.display()
					));
					return String::new();
				}
				expand_variables(stdout, scope)
			}
			Err(err) => {
				self.diagnostics.warn(&format!(
					"{what} for variable '{}' failed on line {} in '{}': {err}. Value set to empty.",
					ctx.key,
					ctx.line_number,
					ctx.source.display()
				));
				String::new()
			}
		}
	}
}

/// Replace every `$NAME` and `${NAME}` with its value in `scope`.
///
/// Names missing from `scope` expand to the empty string. This is a single
/// pass; the replacement text is never expanded again.
pub fn expand_variables(value: &str, scope: &EnvMap) -> String {
	VARIABLE_REFERENCE
		.replace_all(value, |caps: &Captures<'_>| {
			let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
			scope.get(name).cloned().unwrap_or_default()
		})
		.into_owned()
}

/// The secret path in `[show] [flags] PATH [flags]`.
fn secret_path(spec: &str) -> Option<&str> {
	let mut tokens = spec.split_whitespace().peekable();
	if tokens.peek() == Some(&"show") {
		tokens.next();
	}
	tokens.find(|token| !token.starts_with('-'))
}
