use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::KataError;
use crate::KataResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["kataify.toml", ".kataify.toml", ".config/kataify.toml"];

/// Configuration loaded from a `kataify.toml` file.
///
/// ```toml
/// [[files]]
/// source = "tests/bowling.spec.js"
/// destination = "katas/bowling.spec.js"
///
/// [[directories]]
/// source = "tests"
/// destination = "katas"
/// include = ["**/*.spec.js"]
/// exclude = ["fixtures/"]
///
/// disable_gitignore = false
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KataConfig {
	/// Individual source/destination pairs.
	#[serde(default)]
	pub files: Vec<FileEntry>,
	/// Directories whose matching files are all kataified.
	#[serde(default)]
	pub directories: Vec<DirectoryEntry>,
	/// When true, `.gitignore` files are not consulted while walking
	/// `directories`.
	#[serde(default)]
	pub disable_gitignore: bool,
}

/// A single `[[files]]` entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
	pub source: PathBuf,
	pub destination: PathBuf,
}

/// A `[[directories]]` entry. Every file below `source` whose relative path
/// matches `include` is written to the same relative path below
/// `destination`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DirectoryEntry {
	pub source: PathBuf,
	pub destination: PathBuf,
	/// Glob patterns relative to `source`. Empty means every file.
	#[serde(default)]
	pub include: Vec<String>,
	/// Gitignore-style patterns relative to `source`.
	#[serde(default)]
	pub exclude: Vec<String>,
}

impl KataConfig {
	/// Return the first config file path that exists at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> KataResult<Option<KataConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		content.parse().map(Some)
	}

	/// True when the config lists nothing to kataify.
	pub fn is_empty(&self) -> bool {
		self.files.is_empty() && self.directories.is_empty()
	}
}

impl std::str::FromStr for KataConfig {
	type Err = KataError;

	fn from_str(content: &str) -> KataResult<Self> {
		toml::from_str(content).map_err(|e| KataError::ConfigParse(e.to_string()))
	}
}
