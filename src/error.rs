use std::path::PathBuf;

/// Library-level structured errors for load-env.
///
/// Only file-level and launch-level problems are errors. Anything that goes
/// wrong while substituting a single value is reported as a warning and the
/// value degrades to an empty string.
#[derive(Debug, thiserror::Error)]
pub enum LoadEnvError {
	#[error("Environment file '{file_name}' not found in current directory or '{}'", config_dir.display())]
	EnvFileNotFound {
		file_name: String,
		config_dir: PathBuf,
	},

	#[error("Could not open env file: {}", path.display())]
	EnvFileReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Error reading env file {} at line {line}", path.display())]
	EnvFileScanError {
		path: PathBuf,
		line: usize,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to read settings file: {}", path.display())]
	SettingsReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse settings file: {}", path.display())]
	SettingsParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid setting `{field}`: {reason}")]
	InvalidSettings { field: &'static str, reason: String },

	#[error("Invalid substitution pattern: {pattern}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("No env file identifiers given")]
	EmptyChain,

	#[error("Executable '{command}' not found in PATH")]
	CommandNotFound { command: String },

	#[error("Error executing '{command}'")]
	CommandFailed {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Could not determine user home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using LoadEnvError.
pub type Result<T> = std::result::Result<T, LoadEnvError>;
