//! # bottleneck
//!
//! Turns a whisky tasting list kept in a markdown notes vault into a typeset
//! LaTeX document, optionally compiled to PDF.
//!
//! ## Features
//!
//! - Resolves `- [[Note]]` links from a tasting file against the vault
//! - Strict, line-by-line parsing of whisky notes with named failures
//! - Tolerant assembly: malformed notes are reported, the rest still render
//! - Bundled LaTeX template and style, or a custom template
//! - Persisted vault and output directory settings
//!
//! ## Quick Start
//!
//! ```no_run
//! use bottleneck::{Config, Pipeline};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .vault_dir("./vault")
//!     .output_dir("./booklets")
//!     .build()?;
//!
//! let report = Pipeline::new(config)?.run(Path::new("./vault/Herbst.md"))?;
//! println!("success: {}", report.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Selector**: reads the tasting file and checks every linked note exists
//! 2. **Entry parser**: extracts a [`WhiskyEntry`] from each note
//! 3. **Assembler**: renders entries into the document template and writes it
//! 4. **Render invoker**: runs the typesetter on the written document

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod assembler;
mod config;
mod entry;
mod error;
mod pipeline;
mod render;
mod selector;
mod settings;
mod template;
mod template_validator;

pub mod api;

pub use assembler::{Assembler, AssemblyOutcome, AssemblyReport, RejectedEntry};
pub use config::{normalize_path, Config, ConfigBuilder, DOCUMENT_EXTENSION, NOTE_EXTENSION};
pub use entry::{EntryError, Field, WhiskyEntry};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunReport};
pub use render::{RenderInvoker, RenderStatus};
pub use selector::{extract_references, Selection, SelectionOutcome, Selector};
pub use settings::Settings;
pub use template::{latex_escape, INSERT_MARKER, UNKNOWN_VALUE};

/// Runs the complete pipeline for one tasting file.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The tasting file exists but cannot be read
/// - The document cannot be written
/// - The typesetter cannot be started
///
/// # Examples
///
/// ```no_run
/// use bottleneck::{Config, run};
/// use std::path::Path;
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .vault_dir("./vault")
///     .generate_pdf(false)
///     .build()?;
///
/// run(config, Path::new("./vault/Herbst.md"))?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config, tasting_file: &std::path::Path) -> Result<RunReport> {
    Pipeline::new(config)?.run(tasting_file)
}
