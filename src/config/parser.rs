use crate::config::types::Settings;
use crate::error::{LoadEnvError, Result};
use std::path::Path;

/// Parse a settings file from the given path.
pub fn parse_settings_file(path: &Path) -> Result<Settings> {
	let content = std::fs::read_to_string(path).map_err(|source| LoadEnvError::SettingsReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_settings_str(&content, path)
}

/// Parse settings from a string (useful for testing).
pub fn parse_settings_str(content: &str, path: &Path) -> Result<Settings> {
	let settings: Settings =
		toml::from_str(content).map_err(|source| LoadEnvError::SettingsParseError {
			path: path.to_path_buf(),
			source,
		})?;

	settings.validate()?;

	Ok(settings)
}
