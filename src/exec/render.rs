use crate::resolve::EnvMap;

/// `KEY="value"` lines for `--view`, values escaped so control characters
/// stay visible.
pub fn render_view(vars: &EnvMap) -> String {
	vars.iter()
		.map(|(key, value)| format!("{key}={value:?}\n"))
		.collect()
}

/// `export KEY='value'` lines meant for `eval` in a POSIX shell.
pub fn render_exports(vars: &EnvMap) -> String {
	vars.iter()
		.map(|(key, value)| format!("export {key}={}\n", shell_quote(value)))
		.collect()
}

/// Quote `value` for a POSIX shell. Nothing inside is expanded.
pub fn shell_quote(value: &str) -> String {
	format!("'{}'", value.replace('\'', r"'\''"))
}
