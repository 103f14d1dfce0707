//! `kataify_core` turns annotated source files into kata exercises.
//!
//! A line that starts with `////` (after any indentation) is a kata-marker
//! line. The marker's text replaces every line that follows it, up to the next
//! marker or the end of the file:
//!
//! ```text
//! describe('bowling', () => {
//!   ////it('scores a gutter game', () => {});
//!   it('scores a gutter game', () => {
//!     assertThat(score(rolls(20, 0)), equalTo(0));
//!   });
//! ```
//!
//! becomes
//!
//! ```text
//! describe('bowling', () => {
//!   it('scores a gutter game', () => {});
//! ```
//!
//! ## Processing Pipeline
//!
//! ```text
//! kataify.toml
//!   → Config (file pairs and directory globs)
//!   → Project (resolves them into FileMappings)
//!   → Batch driver (read → transform → write per mapping, concurrently)
//!   → FileAccess (disk, memory, or any other backend)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Loading `kataify.toml`.
//! - [`project`] — Expanding config entries into [`FileMapping`]s.
//! - [`file_access`] — The injected read/write capability and its disk and
//!   in-memory implementations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kataify_core::FileMapping;
//! use kataify_core::FsFileAccess;
//! use kataify_core::kataify;
//!
//! # async fn run() -> kataify_core::KataResult<()> {
//! let mappings = [FileMapping::new("tests/bowling.spec.js", "katas/bowling.spec.js")];
//! kataify(&mappings, &FsFileAccess::new()).await?;
//! # Ok(())
//! # }
//! ```

pub use config::*;
pub use driver::*;
pub use error::*;
pub use file_access::*;
pub use project::*;
pub use transform::*;

pub mod config;
mod driver;
#[allow(unused_assignments)]
mod error;
pub mod file_access;
pub mod project;
mod transform;
