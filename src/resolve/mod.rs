//! The resolution engine.
//!
//! This module handles:
//! - Line parsing with quote and escape handling
//! - Per-line lookup scopes
//! - Variable expansion and command substitution
//! - Resolving ordered chains of env files

pub mod chain;
pub mod diagnostics;
pub mod line;
pub mod scope;
pub mod substitute;

pub use chain::{ChainOutput, EnvMode, Resolver, launch_environment};
pub use diagnostics::{Diagnostics, RecordingDiagnostics, StderrDiagnostics, WARNING_PREFIX};
pub use line::{
	LITERAL_DOLLAR_PLACEHOLDER, RawLine, UnquoteError, parse_line, restore_literal_dollars,
	unquote_double,
};
pub use scope::{EnvMap, merge, process_environment};
pub use substitute::{LineContext, SubstitutionOptions, Substitutor, expand_variables};
