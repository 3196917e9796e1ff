use std::cell::RefCell;

/// Prefix that marks every warning written to stderr.
pub const WARNING_PREFIX: &str = "load-env: Warning: ";

/// Sink for non-fatal anomalies found while resolving.
pub trait Diagnostics {
	fn warn(&self, message: &str);
}

/// Writes warnings to stderr, prefixed with [`WARNING_PREFIX`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrDiagnostics;

impl Diagnostics for StderrDiagnostics {
	fn warn(&self, message: &str) {
		eprintln!("{WARNING_PREFIX}{message}");
	}
}

/// Keeps warnings in memory, for tests and for callers that render them
/// themselves.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
	messages: RefCell<Vec<String>>,
}

impl RecordingDiagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn messages(&self) -> Vec<String> {
		self.messages.borrow().clone()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.borrow().is_empty()
	}
}

impl Diagnostics for RecordingDiagnostics {
	fn warn(&self, message: &str) {
		self.messages.borrow_mut().push(message.to_string());
	}
}
