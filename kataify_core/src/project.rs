use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::FileMapping;
use crate::KataConfig;
use crate::KataError;
use crate::KataResult;
use crate::config::DirectoryEntry;

/// Turn a config into the concrete list of mappings for a project rooted at
/// `root`.
///
/// Explicit `[[files]]` come first in declaration order, followed by the
/// files discovered under each `[[directories]]` entry, sorted by path.
/// Duplicate mappings keep their first occurrence.
pub fn resolve_mappings(root: &Path, config: &KataConfig) -> KataResult<Vec<FileMapping>> {
	let mut mappings: Vec<FileMapping> = config
		.files
		.iter()
		.map(|entry| FileMapping::new(&entry.source, &entry.destination).relative_to(root))
		.collect();

	let gitignore = if config.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};

	for entry in &config.directories {
		mappings.extend(directory_mappings(root, entry, &gitignore)?);
	}

	let mut seen = HashSet::new();
	mappings.retain(|mapping| seen.insert(mapping.clone()));

	tracing::debug!(count = mappings.len(), "resolved mappings");
	Ok(mappings)
}

fn directory_mappings(
	root: &Path,
	entry: &DirectoryEntry,
	gitignore: &Gitignore,
) -> KataResult<Vec<FileMapping>> {
	let source_dir = root.join(&entry.source);
	let destination_dir = root.join(&entry.destination);

	if !source_dir.is_dir() {
		return Err(KataError::MissingDirectory { path: source_dir });
	}

	let include = build_glob_set(&entry.include)?;
	let exclude = build_exclude_matcher(&source_dir, &entry.exclude)?;
	let walker = Walker {
		gitignore,
		exclude: &exclude,
		skip: Some(destination_dir.as_path()),
	};

	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	walker.walk(&source_dir, &mut files, &mut visited_dirs)?;
	files.sort();

	Ok(files
		.into_iter()
		.filter_map(|file| {
			let relative = file.strip_prefix(&source_dir).ok()?.to_path_buf();
			if !entry.include.is_empty() && !include.is_match(&relative) {
				return None;
			}
			Some(FileMapping::new(file, destination_dir.join(relative)))
		})
		.collect())
}

struct Walker<'a> {
	gitignore: &'a Gitignore,
	exclude: &'a Gitignore,
	/// Never descend into the destination when it sits inside the source.
	skip: Option<&'a Path>,
}

impl Walker<'_> {
	fn walk(
		&self,
		dir: &Path,
		files: &mut Vec<PathBuf>,
		visited_dirs: &mut HashSet<PathBuf>,
	) -> KataResult<()> {
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !visited_dirs.insert(canonical) {
			tracing::warn!(path = %dir.display(), "skipping already visited directory");
			return Ok(());
		}

		let entries = std::fs::read_dir(dir).map_err(|e| {
			KataError::Walk {
				path: dir.to_path_buf(),
				reason: e.to_string(),
			}
		})?;

		for entry in entries {
			let path = entry?.path();

			if path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(|name| name.starts_with('.'))
			{
				continue;
			}

			let is_dir = path.is_dir();

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				if self.skip == Some(path.as_path()) {
					continue;
				}
				self.walk(&path, files, visited_dirs)?;
			} else {
				files.push(path);
			}
		}

		Ok(())
	}
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> KataResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			KataError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}
	builder.build().map_err(|e| {
		KataError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

fn build_exclude_matcher(root: &Path, patterns: &[String]) -> KataResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			KataError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}
	builder.build().map_err(|e| {
		KataError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.is_file() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(%error, "ignoring unreadable .gitignore");
		}
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}
