//! Configuration and env file discovery for load-env.
//!
//! This module handles:
//! - Locating the config directory
//! - Finding env files for a chain of identifiers
//! - Parsing the optional `config.toml` settings file

pub mod discovery;
pub mod parser;
pub mod types;

pub use discovery::{
	CONFIG_DIR_ENV_VAR, DEFAULT_CONFIG_DIR, config_dir, find_env_file, load_settings,
	locate_chain, parse_chain, settings_path,
};
pub use parser::{parse_settings_file, parse_settings_str};
pub use types::Settings;
