use crate::error::LoadEnvError;
use crate::resolve::SubstitutionOptions;
use serde::Deserialize;

/// Settings from `config.toml` in the load-env config directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
	/// Shell to launch when no executable is given.
	/// Falls back to `$SHELL`, then `bash`.
	#[serde(default)]
	pub shell: Option<String>,

	/// Secret store CLI recognized by `$(<tool> show PATH)`.
	#[serde(default = "default_secret_tool")]
	pub secret_tool: String,

	/// Interpreter for `$[...]` and `$(...)` substitutions.
	#[serde(default = "default_command_shell")]
	pub command_shell: String,

	/// Launch with only the chain's variables unless told otherwise.
	#[serde(default)]
	pub sandbox: bool,
}

fn default_secret_tool() -> String {
	SubstitutionOptions::default().secret_tool
}

fn default_command_shell() -> String {
	SubstitutionOptions::default().command_shell
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			shell: None,
			secret_tool: default_secret_tool(),
			command_shell: default_command_shell(),
			sandbox: false,
		}
	}
}

impl Settings {
	/// Reject settings the substitution engine cannot use.
	pub fn validate(&self) -> Result<(), LoadEnvError> {
		let required = [
			("secret-tool", &self.secret_tool),
			("command-shell", &self.command_shell),
		];

		for (field, value) in required {
			if value.trim().is_empty() {
				return Err(LoadEnvError::InvalidSettings {
					field,
					reason: "must not be empty".to_string(),
				});
			}
			if value.chars().any(char::is_whitespace) {
				return Err(LoadEnvError::InvalidSettings {
					field,
					reason: format!("'{value}' must be a single program name"),
				});
			}
		}

		Ok(())
	}

	pub fn substitution_options(&self) -> SubstitutionOptions {
		SubstitutionOptions {
			secret_tool: self.secret_tool.clone(),
			command_shell: self.command_shell.clone(),
		}
	}
}
