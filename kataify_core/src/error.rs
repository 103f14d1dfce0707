use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum KataError {
	#[error(transparent)]
	#[diagnostic(code(kataify::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read `{}`: {source}", .path.display())]
	#[diagnostic(
		code(kataify::read),
		help("check that the source file exists and is readable")
	)]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{}`: {source}", .path.display())]
	#[diagnostic(
		code(kataify::write),
		help("check that the destination directory is writable")
	)]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(kataify::config_parse),
		help("check that kataify.toml is valid TOML with [[files]] and/or [[directories]] entries")
	)]
	ConfigParse(String),

	#[error("no kataify config found in `{}`", .root.display())]
	#[diagnostic(
		code(kataify::missing_config),
		help("run `kataify init` to create a kataify.toml, or pass `--map SOURCE=DESTINATION`")
	)]
	MissingConfig { root: PathBuf },

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(kataify::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("invalid file mapping `{0}`")]
	#[diagnostic(
		code(kataify::invalid_mapping),
		help("mappings are written as `SOURCE=DESTINATION`")
	)]
	InvalidMapping(String),

	#[error("source directory does not exist: `{}`", .path.display())]
	#[diagnostic(code(kataify::missing_directory))]
	MissingDirectory { path: PathBuf },

	#[error("failed to walk `{}`: {reason}", .path.display())]
	#[diagnostic(code(kataify::walk))]
	Walk { path: PathBuf, reason: String },
}

impl KataError {
	/// Returns true when the error is a read of a path that does not exist.
	pub fn is_not_found(&self) -> bool {
		match self {
			Self::Read { source, .. } | Self::Io(source) => {
				source.kind() == std::io::ErrorKind::NotFound
			}
			_ => false,
		}
	}
}

pub type KataResult<T> = Result<T, KataError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
