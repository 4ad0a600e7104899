use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, anyhow};
use configparser::ini::Ini;

const APP_SECTION: &str = "app";
const DEFAULT_REFERENCE_NAME: &str = "";
const DEFAULT_REINDEX_TIMEOUT_MS: u64 = 100;
const DEFAULT_EXCLUDED_HEADINGS: &[&str] = &["Topic", "See Also", "Meta", "References", "Citations and Footnotes", "Code"];

/// User-facing settings, persisted in the `[app]` section of an INI file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	/// Reference name used when a note links to no `_reference_` note.
	pub reference_name: String,
	/// How long a navigation pane waits for the host to reindex a note.
	pub reindex_timeout: Duration,
	/// Headings that never become aliases.
	pub excluded_headings: Vec<String>,
	/// Whether toggling a tag off also removes its `_auto/` twin.
	pub toggle_auto_tags: bool,
	pub debug_logging: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			reference_name: DEFAULT_REFERENCE_NAME.to_string(),
			reindex_timeout: Duration::from_millis(DEFAULT_REINDEX_TIMEOUT_MS),
			excluded_headings: DEFAULT_EXCLUDED_HEADINGS.iter().map(ToString::to_string).collect(),
			toggle_auto_tags: true,
			debug_logging: false,
		}
	}
}

impl Settings {
	/// Load settings from `path`, falling back to defaults when the file does not exist.
	///
	/// # Errors
	///
	/// Returns an error if the file exists but cannot be read or parsed.
	pub fn load(path: &Path) -> Result<Self> {
		if !path.exists() {
			return Ok(Self::default());
		}
		let contents =
			fs::read_to_string(path).with_context(|| format!("Failed to read settings from {}", path.display()))?;
		Self::from_ini_str(&contents).with_context(|| format!("Failed to parse settings in {}", path.display()))
	}

	/// # Errors
	///
	/// Returns an error if the INI text is malformed.
	pub fn from_ini_str(contents: &str) -> Result<Self> {
		let mut ini = Ini::new();
		ini.read(contents.to_string()).map_err(|err| anyhow!(err))?;
		let defaults = Self::default();
		let get = |key: &str| ini.get(APP_SECTION, key);
		Ok(Self {
			reference_name: get("reference_name").unwrap_or(defaults.reference_name),
			reindex_timeout: get("reindex_timeout_ms")
				.and_then(|v| v.trim().parse::<u64>().ok())
				.map_or(defaults.reindex_timeout, Duration::from_millis),
			excluded_headings: get("excluded_headings").map_or(defaults.excluded_headings, |v| parse_list(&v)),
			toggle_auto_tags: get("toggle_auto_tags").map_or(defaults.toggle_auto_tags, |v| parse_bool(&v, true)),
			debug_logging: get("debug_logging").map_or(defaults.debug_logging, |v| parse_bool(&v, false)),
		})
	}

	#[must_use]
	pub fn to_ini_string(&self) -> String {
		let mut ini = Ini::new();
		let mut set = |key: &str, value: String| {
			ini.set(APP_SECTION, key, Some(value));
		};
		set("reference_name", self.reference_name.clone());
		set("reindex_timeout_ms", self.reindex_timeout.as_millis().to_string());
		set("excluded_headings", self.excluded_headings.join(", "));
		set("toggle_auto_tags", format_bool(self.toggle_auto_tags));
		set("debug_logging", format_bool(self.debug_logging));
		ini.writes()
	}

	/// # Errors
	///
	/// Returns an error if the parent directory cannot be created or the file cannot be written.
	pub fn save(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.with_context(|| format!("Failed to create settings directory {}", parent.display()))?;
		}
		fs::write(path, self.to_ini_string()).with_context(|| format!("Failed to write settings to {}", path.display()))
	}

	#[must_use]
	pub fn is_excluded_heading(&self, heading: &str) -> bool {
		self.excluded_headings.iter().any(|h| h == heading)
	}
}

fn parse_list(value: &str) -> Vec<String> {
	value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(ToString::to_string).collect()
}

fn format_bool(value: bool) -> String {
	if value { "1".to_string() } else { "0".to_string() }
}

fn parse_bool(value: &str, default_value: bool) -> bool {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => true,
		"0" | "false" | "no" | "off" => false,
		_ => default_value,
	}
}
