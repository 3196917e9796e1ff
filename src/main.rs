use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use load_env::LoadEnvError;
use load_env::config::{Settings, config_dir, load_settings, locate_chain};
use load_env::exec::render::{render_exports, render_view};
use load_env::exec::{exit_status, interactive_shell, launch, resolve_command};
use load_env::resolve::{EnvMap, EnvMode, Resolver, StderrDiagnostics, process_environment};
use load_env::runner::ProcessRunner;

/// Filter directives for internal logging, e.g. `LOAD_ENV_LOG=debug`.
const LOG_ENV_VAR: &str = "LOAD_ENV_LOG";

const FORMAT_HELP: &str = "\
Env files are looked up as <ID>.env in the current directory, then in
~/.config/load-env (or $LOAD_ENV_CONFIG_DIR).

Env file format:
  KEY=VALUE
  # comments and blank lines are ignored
  GREETING=\"double quoted, escapes like \\n interpreted\"
  LITERAL='single quoted, no escape processing'
  DB_PASS=$(gopass show myproject/db)   secret lookup
  STAMP=$[date +%s]                     command, may contain ( ) or `
  HOST=$(hostname)                      command, stops at the first )
  URL=http://$HOST:${PORT}              earlier variables and the environment
  PRICE=\\$100                           literal dollar sign";

#[derive(Parser)]
#[command(name = "load-env")]
#[command(
	author,
	version,
	about = "Load environment variables from .env files, then run a command or shell"
)]
#[command(arg_required_else_help = true)]
#[command(after_help = FORMAT_HELP)]
struct Cli {
	/// Display the resolved variables (including plaintext secrets) and exit
	#[arg(long, conflicts_with = "export")]
	view: bool,

	/// Print export statements, for use as: eval "$(load-env --export <ID>)"
	#[arg(long)]
	export: bool,

	/// Give the launched process only the variables defined in the env files
	#[arg(long)]
	sandbox: bool,

	/// Env file identifier; a comma-separated chain is resolved in order
	#[arg(value_name = "ID[,ID...]")]
	ids: String,

	/// Executable and arguments to run (default: an interactive shell)
	#[arg(
		value_name = "EXECUTABLE",
		trailing_var_arg = true,
		allow_hyphen_values = true
	)]
	command: Vec<String>,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("load-env: error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_tracing();

	if !cli.command.is_empty() {
		if cli.view {
			anyhow::bail!(
				"--view only displays variables; no executable may follow the ID (found: '{}')",
				cli.command[0]
			);
		}
		if cli.export {
			anyhow::bail!(
				"When using --export, no executable or arguments should be provided (found: '{}').\n       Did you mean to run 'load-env {} {}' instead?",
				cli.command[0],
				cli.ids,
				cli.command.join(" ")
			);
		}
	}

	let process_env = process_environment();
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let config_dir = config_dir(&process_env).context("Failed to locate config directory")?;
	let settings = load_settings(&config_dir).context("Failed to load settings")?;
	let chain = locate_chain(&cli.ids, &cwd, &config_dir)?;

	let mode = if cli.sandbox || settings.sandbox {
		EnvMode::Sandboxed
	} else {
		EnvMode::Inherit
	};

	let runner = ProcessRunner;
	let diagnostics = StderrDiagnostics;
	let resolver = Resolver::new(&runner, &diagnostics, &settings.substitution_options())?;
	let output = resolver
		.resolve_chain(&chain, &process_env, mode)
		.context("Failed to resolve environment")?;

	if cli.view {
		print!("{}", render_view(&output.resolved));
		return Ok(ExitCode::SUCCESS);
	}

	if cli.export {
		print!("{}", render_exports(&output.resolved));
		return Ok(ExitCode::SUCCESS);
	}

	handle_launch(&cli, &settings, &process_env, &output.launch_env)
}

fn handle_launch(
	cli: &Cli,
	settings: &Settings,
	process_env: &EnvMap,
	launch_env: &EnvMap,
) -> Result<ExitCode> {
	let (program, args) = match cli.command.split_first() {
		Some((program, args)) => (program.clone(), args.to_vec()),
		None => {
			let shell = interactive_shell(settings, process_env);
			eprintln!(
				"load-env: Launching new '{shell}' subshell with environment for '{}'...",
				cli.ids
			);
			(shell, vec!["-i".to_string()])
		}
	};

	let binary = resolve_command(&program).ok_or_else(|| LoadEnvError::CommandNotFound {
		command: program.clone(),
	})?;

	let code = launch(&binary, &program, &args, launch_env)
		.with_context(|| format!("Failed to execute: {}", binary.display()))?;

	Ok(ExitCode::from(exit_status(code)))
}

fn init_tracing() {
	let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
