use crate::resolve::diagnostics::Diagnostics;
use std::path::Path;
use std::str::CharIndices;

/// Stand-in for an escaped `\$` until the whole chain has been resolved.
///
/// It contains no `$`, `(` or `[`, so no substitution pass can match it.
pub const LITERAL_DOLLAR_PLACEHOLDER: &str = "\u{1A}LOAD_ENV_LITERAL_DOLLAR\u{1A}";

/// A `KEY=VALUE` line after quote handling, before substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
	pub key: String,
	pub value: String,
	pub line_number: usize,
}

/// Why a double-quoted value could not be unquoted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnquoteError {
	#[error("unescaped '\"' at offset {0}")]
	UnescapedQuote(usize),

	#[error("unknown escape sequence '\\{0}'")]
	UnknownEscape(char),

	#[error("escape sequence cut short by end of value")]
	TruncatedEscape,

	#[error("invalid escape sequence '\\{0}'")]
	InvalidEscape(String),
}

/// Parse one line of an env file.
///
/// Returns `None` for blank lines, comments and malformed lines; malformed
/// lines are reported through `diagnostics`.
pub fn parse_line(
	line: &str,
	line_number: usize,
	source: &Path,
	diagnostics: &dyn Diagnostics,
) -> Option<RawLine> {
	let line = line.trim();
	if line.is_empty() || line.starts_with('#') {
		return None;
	}

	let Some((key, value)) = line.split_once('=') else {
		diagnostics.warn(&format!(
			"Skipping malformed line {line_number} in '{}': '{line}'. Expected 'KEY=VALUE' format.",
			source.display()
		));
		return None;
	};

	let key = key.trim();
	if key.is_empty() {
		diagnostics.warn(&format!(
			"Skipping line {line_number} in '{}': '{line}' has an empty key.",
			source.display()
		));
		return None;
	}

	let value = strip_quotes(value.trim(), line_number, source, diagnostics);

	Some(RawLine {
		key: key.to_string(),
		value: escape_literal_dollars(&value),
		line_number,
	})
}

fn strip_quotes(
	value: &str,
	line_number: usize,
	source: &Path,
	diagnostics: &dyn Diagnostics,
) -> String {
	if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
		let inner = &value[1..value.len() - 1];
		match unquote_double(inner) {
			Ok(unquoted) => unquoted,
			Err(err) => {
				diagnostics.warn(&format!(
					"Could not fully unquote value '{value}' on line {line_number} in '{}': {err}. Using value after simple outer quote stripping.",
					source.display()
				));
				inner.to_string()
			}
		}
	} else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
		value[1..value.len() - 1].to_string()
	} else {
		value.to_string()
	}
}

/// Interpret escape sequences in the body of a double-quoted value.
///
/// `\$` is left as-is so the literal-dollar pass still sees it.
pub fn unquote_double(inner: &str) -> Result<String, UnquoteError> {
	let mut out = String::with_capacity(inner.len());
	let mut chars = inner.char_indices();

	while let Some((offset, c)) = chars.next() {
		match c {
			// Offsets are reported relative to the opening quote.
			'"' => return Err(UnquoteError::UnescapedQuote(offset + 1)),
			'\\' => {
				let Some((_, esc)) = chars.next() else {
					return Err(UnquoteError::TruncatedEscape);
				};
				match esc {
					'a' => out.push('\x07'),
					'b' => out.push('\x08'),
					'f' => out.push('\x0C'),
					'n' => out.push('\n'),
					'r' => out.push('\r'),
					't' => out.push('\t'),
					'v' => out.push('\x0B'),
					'\\' => out.push('\\'),
					'"' => out.push('"'),
					'$' => out.push_str("\\$"),
					'x' => out.push(read_code_point(&mut chars, "x", 2, 16, true)?),
					'u' => out.push(read_code_point(&mut chars, "u", 4, 16, false)?),
					'U' => out.push(read_code_point(&mut chars, "U", 8, 16, false)?),
					'0'..='7' => {
						let first = esc.to_string();
						out.push(read_code_point(&mut chars, &first, 2, 8, true)?);
					}
					other => return Err(UnquoteError::UnknownEscape(other)),
				}
			}
			c => out.push(c),
		}
	}

	Ok(out)
}

/// Read `count` digits in `radix` following an escape introducer.
///
/// Byte escapes (`\x`, octal) are limited to ASCII since values are UTF-8.
fn read_code_point(
	chars: &mut CharIndices<'_>,
	label: &str,
	count: usize,
	radix: u32,
	ascii_only: bool,
) -> Result<char, UnquoteError> {
	let mut digits = String::with_capacity(count);
	for _ in 0..count {
		match chars.next() {
			Some((_, d)) => digits.push(d),
			None => return Err(UnquoteError::TruncatedEscape),
		}
	}

	let invalid = || UnquoteError::InvalidEscape(format!("{label}{digits}"));

	// Octal escapes carry their first digit in the label.
	let all_digits = format!("{}{digits}", label.trim_start_matches(['x', 'u', 'U']));
	if !all_digits.chars().all(|d| d.is_digit(radix)) {
		return Err(invalid());
	}
	let code = u32::from_str_radix(&all_digits, radix).map_err(|_| invalid())?;
	if ascii_only && code > 0x7F {
		return Err(invalid());
	}
	char::from_u32(code).ok_or_else(invalid)
}

/// Replace every `\$` with [`LITERAL_DOLLAR_PLACEHOLDER`].
pub fn escape_literal_dollars(value: &str) -> String {
	value.replace("\\$", LITERAL_DOLLAR_PLACEHOLDER)
}

/// Turn every [`LITERAL_DOLLAR_PLACEHOLDER`] back into a literal `$`.
pub fn restore_literal_dollars(value: &str) -> String {
	value.replace(LITERAL_DOLLAR_PLACEHOLDER, "$")
}
