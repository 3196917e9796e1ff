use std::collections::BTreeMap;

/// Variable name to value. Ordered so every rendering is deterministic.
pub type EnvMap = BTreeMap<String, String>;

/// Overlay `overrides` on top of `base`; entries from `overrides` win.
///
/// Used for the per-line lookup scope (inherited + resolved so far), for the
/// inherited environment between chained files, and for the launch
/// environment.
pub fn merge(base: &EnvMap, overrides: &EnvMap) -> EnvMap {
	let mut merged = base.clone();
	merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
	merged
}

/// Snapshot of the current process environment.
///
/// Entries that are not valid UTF-8 are converted lossily.
pub fn process_environment() -> EnvMap {
	std::env::vars_os()
		.map(|(k, v)| {
			(
				k.to_string_lossy().into_owned(),
				v.to_string_lossy().into_owned(),
			)
		})
		.collect()
}
