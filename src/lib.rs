//! load-env - resolve layered `.env` files and launch a command with them.
//!
//! This library provides the core functionality for load-env, including:
//! - Line parsing with quote and escape handling
//! - Variable expansion and command substitution (`$(...)`, `$[...]`,
//!   and secret lookups such as `$(gopass show path)`)
//! - Resolving chains of env files where later files override earlier ones
//! - Env file discovery and the optional settings file
//! - Launching the target process with the resolved environment
//!
//! # Example
//!
//! ```no_run
//! use load_env::resolve::{EnvMode, Resolver, StderrDiagnostics, SubstitutionOptions, process_environment};
//! use load_env::runner::ProcessRunner;
//! use std::path::PathBuf;
//!
//! let runner = ProcessRunner;
//! let diagnostics = StderrDiagnostics;
//! let resolver = Resolver::new(&runner, &diagnostics, &SubstitutionOptions::default()).unwrap();
//!
//! let chain = vec![PathBuf::from("base.env"), PathBuf::from("dev.env")];
//! let output = resolver
//!     .resolve_chain(&chain, &process_environment(), EnvMode::Sandboxed)
//!     .unwrap();
//!
//! for (key, value) in &output.resolved {
//!     println!("{key}={value}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod exec;
pub mod resolve;
pub mod runner;

pub use error::{LoadEnvError, Result};
pub use resolve::EnvMap;
