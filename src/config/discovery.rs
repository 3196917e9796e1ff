use crate::config::parser::parse_settings_file;
use crate::config::types::Settings;
use crate::error::{LoadEnvError, Result};
use crate::resolve::EnvMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "LOAD_ENV_CONFIG_DIR";

/// Config directory relative to the user's home directory.
pub const DEFAULT_CONFIG_DIR: &str = ".config/load-env";

/// Settings file name inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// The directory holding shared env files and `config.toml`.
///
/// `$LOAD_ENV_CONFIG_DIR` wins when set and non-empty; otherwise
/// `~/.config/load-env`.
pub fn config_dir(process_env: &EnvMap) -> Result<PathBuf> {
	if let Some(dir) = process_env.get(CONFIG_DIR_ENV_VAR)
		&& !dir.is_empty()
	{
		return Ok(PathBuf::from(dir));
	}

	let home_dir = dirs::home_dir().ok_or(LoadEnvError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(DEFAULT_CONFIG_DIR))
}

/// Split a comma-separated chain argument into identifiers.
///
/// Segments are trimmed and empty segments skipped.
pub fn parse_chain(ids: &str) -> Result<Vec<String>> {
	let ids: Vec<String> = ids
		.split(',')
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.map(str::to_string)
		.collect();

	if ids.is_empty() {
		return Err(LoadEnvError::EmptyChain);
	}
	Ok(ids)
}

/// Find `<id>.env`, first in `cwd`, then in `config_dir`.
pub fn find_env_file(id: &str, cwd: &Path, config_dir: &Path) -> Result<PathBuf> {
	let file_name = format!("{id}.env");

	let local = cwd.join(&file_name);
	if local.is_file() {
		return Ok(local);
	}

	let shared = config_dir.join(&file_name);
	if shared.is_file() {
		return Ok(shared);
	}

	Err(LoadEnvError::EnvFileNotFound {
		file_name,
		config_dir: config_dir.to_path_buf(),
	})
}

/// Resolve a chain argument to env file paths, in chain order.
pub fn locate_chain(ids: &str, cwd: &Path, config_dir: &Path) -> Result<Vec<PathBuf>> {
	parse_chain(ids)?
		.iter()
		.map(|id| find_env_file(id, cwd, config_dir))
		.collect()
}

/// Path of the settings file inside `config_dir`.
pub fn settings_path(config_dir: &Path) -> PathBuf {
	config_dir.join(SETTINGS_FILE_NAME)
}

/// Load `config.toml` from `config_dir`, or defaults if it does not exist.
pub fn load_settings(config_dir: &Path) -> Result<Settings> {
	let path = settings_path(config_dir);
	if path.exists() {
		parse_settings_file(&path)
	} else {
		Ok(Settings::default())
	}
}
