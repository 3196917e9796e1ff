use crate::error::{LoadEnvError, Result};
use crate::resolve::diagnostics::Diagnostics;
use crate::resolve::line::{parse_line, restore_literal_dollars};
use crate::resolve::scope::{EnvMap, merge};
use crate::resolve::substitute::{LineContext, SubstitutionOptions, Substitutor};
use crate::runner::CommandRunner;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Which variables the launched process gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvMode {
	/// Process environment overlaid with the resolved variables.
	#[default]
	Inherit,

	/// Only the variables defined by the chain.
	Sandboxed,
}

/// Result of resolving a whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutput {
	/// Every variable defined across the chain, later files winning.
	pub resolved: EnvMap,

	/// Environment to hand to the launched process.
	pub launch_env: EnvMap,
}

/// Resolves env files, alone or as an ordered chain.
pub struct Resolver<'a> {
	substitutor: Substitutor<'a>,
	diagnostics: &'a dyn Diagnostics,
}

impl<'a> Resolver<'a> {
	pub fn new(
		runner: &'a dyn CommandRunner,
		diagnostics: &'a dyn Diagnostics,
		options: &SubstitutionOptions,
	) -> Result<Self> {
		Ok(Self {
			substitutor: Substitutor::new(runner, diagnostics, options)?,
			diagnostics,
		})
	}

	/// Resolve a single env file against `inherited`.
	///
	/// The returned values may still contain literal-dollar placeholders;
	/// [`Resolver::resolve_chain`] restores them once the chain is done.
	pub fn resolve_file(&self, path: &Path, inherited: &EnvMap) -> Result<EnvMap> {
		let file = File::open(path).map_err(|source| LoadEnvError::EnvFileReadError {
			path: path.to_path_buf(),
			source,
		})?;
		self.resolve_reader(BufReader::new(file), path, inherited)
	}

	/// Resolve env file content from any reader. `path` is used for messages.
	///
	/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
	/// failing the file.
	pub fn resolve_reader<R: BufRead>(
		&self,
		mut reader: R,
		path: &Path,
		inherited: &EnvMap,
	) -> Result<EnvMap> {
		let mut resolved = EnvMap::new();
		let mut buf = Vec::new();
		let mut line_number = 0;

		loop {
			buf.clear();
			let read = reader.read_until(b'\n', &mut buf).map_err(|source| {
				LoadEnvError::EnvFileScanError {
					path: path.to_path_buf(),
					line: line_number + 1,
					source,
				}
			})?;
			if read == 0 {
				break;
			}
			line_number += 1;

			let line = String::from_utf8_lossy(strip_line_ending(&buf));
			let Some(raw) = parse_line(&line, line_number, path, self.diagnostics) else {
				continue;
			};

			// The key is not in scope while its own value is resolved.
			let scope = merge(inherited, &resolved);
			let ctx = LineContext {
				source: path,
				line_number: raw.line_number,
				key: &raw.key,
			};
			let value = self.substitutor.substitute(&raw.value, &scope, ctx);
			tracing::trace!(key = %raw.key, line = raw.line_number, "resolved");

			resolved.insert(raw.key, value);
		}

		tracing::debug!(path = %path.display(), count = resolved.len(), "resolved env file");
		Ok(resolved)
	}

	/// Resolve `paths` in order and build the launch environment.
	///
	/// Each file sees the process environment plus everything resolved by
	/// the files before it.
	pub fn resolve_chain(
		&self,
		paths: &[PathBuf],
		process_env: &EnvMap,
		mode: EnvMode,
	) -> Result<ChainOutput> {
		let mut joint = EnvMap::new();
		let mut inherited = process_env.clone();

		for path in paths {
			let resolved = self.resolve_file(path, &inherited)?;
			joint.extend(resolved);
			inherited = merge(process_env, &joint);
		}

		for value in joint.values_mut() {
			*value = restore_literal_dollars(value);
		}

		let launch_env = launch_environment(&joint, process_env, mode);
		Ok(ChainOutput {
			resolved: joint,
			launch_env,
		})
	}
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
	let line = line.strip_suffix(b"\n").unwrap_or(line);
	line.strip_suffix(b"\r").unwrap_or(line)
}

/// Environment for the launched process.
pub fn launch_environment(resolved: &EnvMap, process_env: &EnvMap, mode: EnvMode) -> EnvMap {
	match mode {
		EnvMode::Inherit => merge(process_env, resolved),
		EnvMode::Sandboxed => resolved.clone(),
	}
}
