use crate::config::NOTE_EXTENSION;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `- [[Name]]` list items; the capture holds the linked note name.
static NOTE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"- \[\[([^\]]+)\]\]").expect("note link pattern is valid"));

/// Validated notes selected by a tasting file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Existing note paths in link order
    pub paths: Vec<PathBuf>,

    /// Tasting file name without extension, used to name the document
    pub base_name: String,
}

/// Result of reading a tasting file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Every link resolved to an existing note.
    Success(Selection),

    /// The tasting file itself does not exist.
    FileNotFound(PathBuf),

    /// The tasting file contains no links.
    NoReferencesFound(PathBuf),

    /// Some links point to notes that do not exist, in encounter order.
    MissingFiles(Vec<PathBuf>),
}

impl SelectionOutcome {
    /// Returns the selection if every link resolved.
    #[must_use]
    pub const fn selection(&self) -> Option<&Selection> {
        match self {
            Self::Success(selection) => Some(selection),
            _ => None,
        }
    }

    /// Returns true if the selection can be assembled.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Resolves tasting file links against a vault.
#[derive(Debug, Clone)]
pub struct Selector {
    vault_dir: PathBuf,
}

impl Selector {
    /// Creates a selector for the given vault root.
    pub fn new(vault_dir: impl Into<PathBuf>) -> Self {
        Self {
            vault_dir: vault_dir.into(),
        }
    }

    /// Reads `tasting_file` and checks that every linked note exists.
    ///
    /// Nothing is written; calling this repeatedly on unchanged input yields
    /// the same outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the tasting file exists but cannot be read.
    pub fn select(&self, tasting_file: &Path) -> Result<SelectionOutcome> {
        if !tasting_file.exists() {
            return Ok(SelectionOutcome::FileNotFound(tasting_file.to_path_buf()));
        }

        let text = fs::read_to_string(tasting_file).map_err(|e| Error::io(tasting_file, e))?;

        let (found, missing): (Vec<PathBuf>, Vec<PathBuf>) = extract_references(&text)
            .map(|name| self.resolve(name))
            .partition(|path| path.exists());

        if !missing.is_empty() {
            info!("{} linked notes are missing", missing.len());
            return Ok(SelectionOutcome::MissingFiles(missing));
        }

        if found.is_empty() {
            return Ok(SelectionOutcome::NoReferencesFound(
                tasting_file.to_path_buf(),
            ));
        }

        let base_name = tasting_file
            .file_stem()
            .map_or_else(|| "out".to_string(), |s| s.to_string_lossy().into_owned());

        debug!("Selected {} notes for {}", found.len(), base_name);
        Ok(SelectionOutcome::Success(Selection {
            paths: found,
            base_name,
        }))
    }

    /// Maps a note name to its file in the vault.
    #[must_use]
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.vault_dir.join(format!("{name}.{NOTE_EXTENSION}"))
    }
}

/// Yields the linked note names in order of appearance.
pub fn extract_references(text: &str) -> impl Iterator<Item = &str> {
    NOTE_LINK
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}
