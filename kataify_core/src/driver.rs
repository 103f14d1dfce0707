use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use futures::future::join_all;
use serde::Deserialize;
use serde::Serialize;

use crate::FileAccess;
use crate::KataError;
use crate::KataResult;
use crate::kataify_content;

/// A source file and the path its kata version is written to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileMapping {
	pub source: PathBuf,
	pub destination: PathBuf,
}

impl FileMapping {
	pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
		Self {
			source: source.into(),
			destination: destination.into(),
		}
	}

	/// Resolve relative paths in this mapping against `root`.
	#[must_use]
	pub fn relative_to(&self, root: &Path) -> Self {
		Self {
			source: root.join(&self.source),
			destination: root.join(&self.destination),
		}
	}
}

impl fmt::Display for FileMapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} -> {}",
			self.source.display(),
			self.destination.display()
		)
	}
}

/// Parses the `SOURCE=DESTINATION` form accepted on the command line.
impl FromStr for FileMapping {
	type Err = KataError;

	fn from_str(value: &str) -> KataResult<Self> {
		let Some((source, destination)) = value.split_once('=') else {
			return Err(KataError::InvalidMapping(value.to_string()));
		};
		let (source, destination) = (source.trim(), destination.trim());

		if source.is_empty() || destination.is_empty() {
			return Err(KataError::InvalidMapping(value.to_string()));
		}

		Ok(Self::new(source, destination))
	}
}

/// What happened to a mapping that was kataified successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
	pub source: PathBuf,
	pub destination: PathBuf,
	pub markers: usize,
	pub removed_lines: usize,
	/// Whether the written content differs from the source content.
	pub changed: bool,
}

/// The outcome of one mapping within a batch.
#[derive(Debug)]
pub struct MappingOutcome {
	pub mapping: FileMapping,
	pub result: KataResult<MappingSummary>,
}

/// Outcomes of a batch run, in the order the mappings were given.
#[derive(Debug, Default)]
pub struct BatchReport {
	pub outcomes: Vec<MappingOutcome>,
}

impl BatchReport {
	pub fn is_ok(&self) -> bool {
		self.outcomes.iter().all(|outcome| outcome.result.is_ok())
	}

	pub fn succeeded(&self) -> impl Iterator<Item = &MappingSummary> {
		self.outcomes
			.iter()
			.filter_map(|outcome| outcome.result.as_ref().ok())
	}

	pub fn failed(&self) -> impl Iterator<Item = (&FileMapping, &KataError)> {
		self.outcomes.iter().filter_map(|outcome| {
			outcome
				.result
				.as_ref()
				.err()
				.map(|error| (&outcome.mapping, error))
		})
	}

	/// Collapse the report into the first failure, if any.
	pub fn into_result(self) -> KataResult<()> {
		for outcome in self.outcomes {
			outcome.result?;
		}
		Ok(())
	}
}

/// Kataify every mapping: read its source, transform it, and write the
/// result to its destination.
///
/// Mappings are processed concurrently and independently. The returned future
/// resolves once every read and write has finished. When any mapping fails,
/// the first failure (in mapping order) is returned exactly as the
/// [`FileAccess`] produced it; the other mappings still run to completion.
pub async fn kataify<A: FileAccess>(mappings: &[FileMapping], access: &A) -> KataResult<()> {
	kataify_with_report(mappings, access).await.into_result()
}

/// Like [`kataify`] but reports the outcome of every mapping.
#[tracing::instrument(skip_all, fields(mappings = mappings.len()))]
pub async fn kataify_with_report<A: FileAccess>(
	mappings: &[FileMapping],
	access: &A,
) -> BatchReport {
	if mappings.is_empty() {
		return BatchReport::default();
	}

	let tasks = mappings
		.iter()
		.map(|mapping| kataify_mapping(mapping, access));
	let results = join_all(tasks).await;

	let outcomes = mappings
		.iter()
		.cloned()
		.zip(results)
		.map(|(mapping, result)| {
			if let Err(error) = &result {
				tracing::warn!(%mapping, %error, "failed to kataify file");
			}
			MappingOutcome { mapping, result }
		})
		.collect();

	BatchReport { outcomes }
}

async fn kataify_mapping<A: FileAccess>(
	mapping: &FileMapping,
	access: &A,
) -> KataResult<MappingSummary> {
	let content = access.read(&mapping.source).await?;
	let kataified = kataify_content(&content);
	let changed = kataified.content != content;

	tracing::debug!(
		%mapping,
		markers = kataified.markers,
		removed_lines = kataified.removed_lines,
		"kataified file"
	);

	access
		.write(&mapping.destination, kataified.content)
		.await?;

	Ok(MappingSummary {
		source: mapping.source.clone(),
		destination: mapping.destination.clone(),
		markers: kataified.markers,
		removed_lines: kataified.removed_lines,
		changed,
	})
}

/// A destination whose content does not match its kataified source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleFile {
	pub source: PathBuf,
	pub destination: PathBuf,
	/// Current destination content, `None` when the destination is missing.
	pub current: Option<String>,
	pub expected: String,
}

impl StaleFile {
	pub fn is_missing(&self) -> bool {
		self.current.is_none()
	}
}

/// Compare every destination with what kataifying its source would produce.
/// Nothing is written.
#[tracing::instrument(skip_all, fields(mappings = mappings.len()))]
pub async fn check<A: FileAccess>(mappings: &[FileMapping], access: &A) -> KataResult<Vec<StaleFile>> {
	let tasks = mappings.iter().map(|mapping| check_mapping(mapping, access));
	let results = join_all(tasks).await;

	let mut stale = Vec::new();
	for result in results {
		if let Some(entry) = result? {
			stale.push(entry);
		}
	}

	Ok(stale)
}

async fn check_mapping<A: FileAccess>(
	mapping: &FileMapping,
	access: &A,
) -> KataResult<Option<StaleFile>> {
	let expected = kataify_content(&access.read(&mapping.source).await?).content;
	let current = match access.read(&mapping.destination).await {
		Ok(current) => Some(current),
		Err(error) if error.is_not_found() => None,
		Err(error) => return Err(error),
	};

	if current.as_deref() == Some(expected.as_str()) {
		return Ok(None);
	}

	tracing::debug!(%mapping, missing = current.is_none(), "destination is stale");

	Ok(Some(StaleFile {
		source: mapping.source.clone(),
		destination: mapping.destination.clone(),
		current,
		expected,
	}))
}
