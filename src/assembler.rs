use crate::{
    config::Config,
    entry::{EntryError, WhiskyEntry},
    error::{Error, Result},
    template::TemplateEngine,
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// A note that exists but could not be turned into an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Path of the note
    pub path: PathBuf,

    /// Why parsing failed
    pub error: EntryError,
}

/// Whether every selected note made it into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// All notes were parsed and rendered.
    Success,

    /// The document was written, but these notes were left out.
    PartialFailure(Vec<RejectedEntry>),
}

impl AssemblyOutcome {
    /// Returns true if no note was rejected.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Summary of one assembly pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Path of the written document
    pub document: PathBuf,

    /// Names of the entries rendered into the document, in order
    pub entries: Vec<String>,

    /// Whether any note was rejected
    pub outcome: AssemblyOutcome,
}

/// Renders selected notes into the document and writes it.
pub struct Assembler {
    output_dir: PathBuf,
    template_engine: TemplateEngine,
}

impl Assembler {
    /// Creates a new assembler from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if template engine initialization fails.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            output_dir: config.output_dir.clone(),
            template_engine: TemplateEngine::new(config)?,
        })
    }

    /// Parses every note in `paths` and writes `<output_dir>/<base_name>.tex`.
    ///
    /// Notes that fail to parse are skipped and reported in the outcome; the
    /// document is written with the remaining entries in input order. An
    /// empty `paths` writes the template with an empty body.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory cannot be created
    /// - Template rendering fails
    /// - The document cannot be written
    pub fn assemble(&self, paths: &[PathBuf], base_name: &str) -> Result<AssemblyReport> {
        let mut fragments = Vec::with_capacity(paths.len());
        let mut entries = Vec::with_capacity(paths.len());
        let mut rejected = Vec::new();

        for path in paths {
            match read_entry(path) {
                Ok(entry) => {
                    fragments.push(self.template_engine.render_entry(&entry)?);
                    debug!("Found: {}", entry.name);
                    entries.push(entry.name);
                }
                Err(error) => {
                    warn!("Skipping {}: {}", path.display(), error);
                    rejected.push(RejectedEntry {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))?;

        let document = self.document_path(base_name);
        let content = self.template_engine.render_document(&fragments);
        write_file_atomic(&document, &content)?;

        info!(
            "Wrote {} entries to {}",
            fragments.len(),
            document.display()
        );

        let outcome = if rejected.is_empty() {
            AssemblyOutcome::Success
        } else {
            AssemblyOutcome::PartialFailure(rejected)
        };

        Ok(AssemblyReport {
            document,
            entries,
            outcome,
        })
    }

    /// Generates the output file path for a tasting.
    fn document_path(&self, base_name: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            base_name,
            crate::config::DOCUMENT_EXTENSION
        ))
    }
}

/// Reads and parses one note; read failures count as rejected entries.
fn read_entry(path: &Path) -> std::result::Result<WhiskyEntry, EntryError> {
    let text = fs::read_to_string(path).map_err(|e| EntryError::Unreadable {
        message: e.to_string(),
    })?;
    WhiskyEntry::parse(&text)
}

/// Writes a file atomically.
///
/// # Process
///
/// 1. Writes content to a temporary file next to the target
/// 2. Syncs the temporary file to disk
/// 3. Atomically renames the temporary file to the target path
fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("tex.tmp");
    let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    drop(temp_file);

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Field;
    use crate::template::INSERT_MARKER;
    use assert_fs::prelude::*;

    fn note(name: &str) -> String {
        format!(
            "# {name}\n\
             - [ ] Kühlgefiltert\n\
             - [ ] Gefärbt\n\
             - Typ: Single Malt\n\
             - Region: Islay\n\
             - Destillerie: [[Lagavulin]]\n\
             - Alter: 16 Jahre\n\
             - Stärke: 43% vol.\n\
             - Reifung: Sherry\n"
        )
    }

    fn create_assembler(temp: &assert_fs::TempDir) -> Assembler {
        let config = Config::builder()
            .vault_dir(temp.path())
            .output_dir(temp.path().join("out"))
            .build()
            .unwrap();
        Assembler::new(&config).unwrap()
    }

    fn write_note(temp: &assert_fs::TempDir, name: &str, content: &str) -> PathBuf {
        let child = temp.child(format!("{name}.md"));
        child.write_str(content).unwrap();
        child.path().to_path_buf()
    }

    #[test]
    fn test_assemble_all_valid() {
        let temp = assert_fs::TempDir::new().unwrap();
        let paths = vec![
            write_note(&temp, "A", &note("A")),
            write_note(&temp, "B", &note("B")),
        ];

        let report = create_assembler(&temp).assemble(&paths, "Herbst").unwrap();
        assert_eq!(report.outcome, AssemblyOutcome::Success);
        assert_eq!(report.entries, vec!["A", "B"]);
        assert_eq!(report.document, temp.path().join("out").join("Herbst.tex"));

        let document = fs::read_to_string(&report.document).unwrap();
        assert!(!document.contains(INSERT_MARKER));
        assert_eq!(document.matches("\\whiskey{").count(), 2);

        let a = document.find("\\whiskey{A}").unwrap();
        let b = document.find("\\whiskey{B}").unwrap();
        assert!(a < b);
        assert!(document.contains("{Sherry}\n\n\\whiskey{B}"));
    }

    #[test]
    fn test_assemble_blank_fields_render_as_unknown() {
        let temp = assert_fs::TempDir::new().unwrap();
        let paths = vec![write_note(
            &temp,
            "A",
            "# A\n- [ ] Kühlgefiltert\n- [ ] Gefärbt\n- Typ: \n- Region: Islay\n\
             - Destillerie: X\n- Alter: \n- Stärke: 43% vol.\n- Reifung: \n",
        )];

        let report = create_assembler(&temp).assemble(&paths, "Herbst").unwrap();
        assert_eq!(report.outcome, AssemblyOutcome::Success);

        let document = fs::read_to_string(&report.document).unwrap();
        assert!(document.contains(
            "\\whiskey{A}\n{Keine Angabe}\n{43}\n\
             {Nicht kühlgefiltert, ohne Farbstoff}\n{X (Islay)}\n\
             {Keine Angabe}\n{Keine Angabe}"
        ));
        assert!(!document.contains("{}"));
    }

    #[test]
    fn test_assemble_partial_failure() {
        let temp = assert_fs::TempDir::new().unwrap();
        let broken = write_note(&temp, "Broken", "# Broken\n- Typ: Blend\n");
        let paths = vec![
            write_note(&temp, "A", &note("A")),
            broken.clone(),
            write_note(&temp, "C", &note("C")),
        ];

        let report = create_assembler(&temp).assemble(&paths, "Herbst").unwrap();
        assert_eq!(report.entries, vec!["A", "C"]);
        assert_eq!(
            report.outcome,
            AssemblyOutcome::PartialFailure(vec![RejectedEntry {
                path: broken,
                error: EntryError::Unexpected {
                    field: Field::ChillFiltered,
                    line: 2,
                },
            }])
        );

        let document = fs::read_to_string(&report.document).unwrap();
        assert!(document.contains("\\whiskey{A}"));
        assert!(document.contains("\\whiskey{C}"));
        assert!(!document.contains("Broken"));
    }

    #[test]
    fn test_assemble_all_rejected_still_writes() {
        let temp = assert_fs::TempDir::new().unwrap();
        let paths = vec![write_note(&temp, "Empty", "")];

        let report = create_assembler(&temp).assemble(&paths, "Herbst").unwrap();
        assert!(report.entries.is_empty());
        assert!(!report.outcome.is_success());
        assert!(report.document.exists());
    }

    #[test]
    fn test_assemble_empty_selection() {
        let temp = assert_fs::TempDir::new().unwrap();

        let report = create_assembler(&temp).assemble(&[], "Leer").unwrap();
        assert!(report.outcome.is_success());
        assert!(report.entries.is_empty());

        let document = fs::read_to_string(&report.document).unwrap();
        assert!(!document.contains(INSERT_MARKER));
        assert!(!document.contains("\\whiskey{"));
    }

    #[test]
    fn test_unreadable_note_is_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let binary = temp.child("Binary.md");
        binary.write_binary(&[0xff, 0xfe, 0x00]).unwrap();

        let report = create_assembler(&temp)
            .assemble(&[binary.path().to_path_buf()], "Herbst")
            .unwrap();

        match report.outcome {
            AssemblyOutcome::PartialFailure(rejected) => {
                assert!(matches!(rejected[0].error, EntryError::Unreadable { .. }));
            }
            AssemblyOutcome::Success => panic!("binary note was accepted"),
        }
    }

    #[test]
    fn test_assemble_overwrites_existing_document() {
        let temp = assert_fs::TempDir::new().unwrap();
        let out = temp.child("out");
        out.create_dir_all().unwrap();
        out.child("Herbst.tex").write_str("stale").unwrap();

        let paths = vec![write_note(&temp, "A", &note("A"))];
        let report = create_assembler(&temp).assemble(&paths, "Herbst").unwrap();

        let document = fs::read_to_string(&report.document).unwrap();
        assert!(!document.contains("stale"));
        assert!(!out.child("Herbst.tex.tmp").exists());
    }
}
