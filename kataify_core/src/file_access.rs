use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::future::Future;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::KataError;
use crate::KataResult;

/// Read and write access to files, injected into the batch driver.
///
/// The driver never touches the file system itself, so any backend that can
/// read and write text by path can be plugged in: the local disk
/// ([`FsFileAccess`]), an in-memory map ([`MemoryFileAccess`]), or a remote
/// blob store.
pub trait FileAccess: Send + Sync {
	/// Read the full text content at `path`.
	fn read(&self, path: &Path) -> impl Future<Output = KataResult<String>> + Send;

	/// Replace the content at `path` with `content`.
	fn write(&self, path: &Path, content: String) -> impl Future<Output = KataResult<()>> + Send;
}

/// [`FileAccess`] backed by the local file system.
#[derive(Debug, Clone)]
pub struct FsFileAccess {
	root: Option<PathBuf>,
	create_dirs: bool,
}

impl Default for FsFileAccess {
	fn default() -> Self {
		Self {
			root: None,
			create_dirs: true,
		}
	}
}

impl FsFileAccess {
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolve relative paths against `root` instead of the working directory.
	pub fn with_root(root: impl Into<PathBuf>) -> Self {
		Self {
			root: Some(root.into()),
			..Self::default()
		}
	}

	/// Whether missing parent directories of a destination are created before
	/// writing. Enabled by default.
	#[must_use]
	pub fn create_dirs(mut self, create_dirs: bool) -> Self {
		self.create_dirs = create_dirs;
		self
	}

	pub fn resolve(&self, path: &Path) -> PathBuf {
		match &self.root {
			Some(root) if path.is_relative() => root.join(path),
			_ => path.to_path_buf(),
		}
	}
}

impl FileAccess for FsFileAccess {
	async fn read(&self, path: &Path) -> KataResult<String> {
		let resolved = self.resolve(path);
		tokio::fs::read_to_string(&resolved)
			.await
			.map_err(|source| KataError::Read {
				path: resolved,
				source,
			})
	}

	async fn write(&self, path: &Path, content: String) -> KataResult<()> {
		let resolved = self.resolve(path);

		if self.create_dirs {
			if let Some(parent) = resolved.parent().filter(|p| !p.as_os_str().is_empty()) {
				tokio::fs::create_dir_all(parent)
					.await
					.map_err(|source| KataError::Write {
						path: resolved.clone(),
						source,
					})?;
			}
		}

		tokio::fs::write(&resolved, content)
			.await
			.map_err(|source| KataError::Write {
				path: resolved,
				source,
			})
	}
}

/// A single call made through a [`MemoryFileAccess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAccessCall {
	Read(PathBuf),
	Write(PathBuf, String),
}

#[derive(Debug, Default)]
struct MemoryState {
	files: BTreeMap<PathBuf, String>,
	read_only: BTreeSet<PathBuf>,
	calls: Vec<FileAccessCall>,
}

/// In-memory [`FileAccess`] that records every call made through it.
#[derive(Debug, Default)]
pub struct MemoryFileAccess {
	state: Mutex<MemoryState>,
}

impl MemoryFileAccess {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build from `(path, content)` pairs.
	pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
	where
		P: Into<PathBuf>,
		C: Into<String>,
	{
		let access = Self::new();
		for (path, content) in files {
			access.insert(path, content);
		}
		access
	}

	pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
		self.lock().files.insert(path.into(), content.into());
	}

	/// Make writes to `path` fail with a permission error.
	pub fn set_read_only(&self, path: impl Into<PathBuf>) {
		self.lock().read_only.insert(path.into());
	}

	/// Current content stored at `path`.
	pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
		self.lock().files.get(path.as_ref()).cloned()
	}

	/// Every stored file, sorted by path.
	pub fn files(&self) -> BTreeMap<PathBuf, String> {
		self.lock().files.clone()
	}

	/// Calls made so far, in the order they were issued.
	pub fn calls(&self) -> Vec<FileAccessCall> {
		self.lock().calls.clone()
	}

	pub fn reads(&self) -> Vec<PathBuf> {
		self.lock()
			.calls
			.iter()
			.filter_map(|call| {
				match call {
					FileAccessCall::Read(path) => Some(path.clone()),
					FileAccessCall::Write(..) => None,
				}
			})
			.collect()
	}

	pub fn writes(&self) -> Vec<(PathBuf, String)> {
		self.lock()
			.calls
			.iter()
			.filter_map(|call| {
				match call {
					FileAccessCall::Write(path, content) => Some((path.clone(), content.clone())),
					FileAccessCall::Read(_) => None,
				}
			})
			.collect()
	}

	fn lock(&self) -> MutexGuard<'_, MemoryState> {
		// A panic while holding the lock leaves the map itself consistent.
		self.state
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner)
	}
}

impl FileAccess for MemoryFileAccess {
	async fn read(&self, path: &Path) -> KataResult<String> {
		let mut state = self.lock();
		state.calls.push(FileAccessCall::Read(path.to_path_buf()));
		state
			.files
			.get(path)
			.cloned()
			.ok_or_else(|| {
				KataError::Read {
					path: path.to_path_buf(),
					source: io::Error::new(io::ErrorKind::NotFound, "no such file in memory"),
				}
			})
	}

	async fn write(&self, path: &Path, content: String) -> KataResult<()> {
		let mut state = self.lock();
		state
			.calls
			.push(FileAccessCall::Write(path.to_path_buf(), content.clone()));

		if state.read_only.contains(path) {
			return Err(KataError::Write {
				path: path.to_path_buf(),
				source: io::Error::new(io::ErrorKind::PermissionDenied, "file is read-only"),
			});
		}

		state.files.insert(path.to_path_buf(), content);
		Ok(())
	}
}
