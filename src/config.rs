use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

const DEFAULT_LATEX_PROGRAM: &str = "pdflatex";
const DEFAULT_OUTPUT_SUBDIR: &str = "out";
const DEFAULT_AUX_SUBDIR: &str = "aux";

/// File extension of the generated document.
pub const DOCUMENT_EXTENSION: &str = "tex";

/// Extension appended to note references when resolving them in the vault.
pub const NOTE_EXTENSION: &str = "md";

/// Configuration for a bottleneck run.
///
/// Use [`Config::builder()`] to construct a new configuration. All paths are
/// normalized by [`ConfigBuilder::build`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory of the notes vault
    pub vault_dir: PathBuf,

    /// Directory receiving the generated `.tex` file
    pub output_dir: PathBuf,

    /// Whether to run the typesetting tool after assembly
    pub generate_pdf: bool,

    /// Typesetting executable
    pub latex_program: String,

    /// Document template overriding the bundled one
    pub template_path: Option<PathBuf>,

    /// Directory passed to the typesetter for style files (defaults to `output_dir`)
    pub include_dir: Option<PathBuf>,

    /// Subdirectory of `output_dir` receiving the PDF
    pub output_subdir: String,

    /// Subdirectory of `output_dir` receiving auxiliary files
    pub aux_subdir: String,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bottleneck::Config;
    ///
    /// let config = Config::builder()
    ///     .vault_dir("~/vaults/whisky")
    ///     .output_dir("./tastings")
    ///     .generate_pdf(false)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Vault directory doesn't exist or is not a directory
    /// - Output directory points at a regular file
    /// - Typesetting program or subdirectory names are empty
    /// - A readable custom template does not contain exactly one insert marker
    pub fn validate(&self) -> Result<()> {
        if !self.vault_dir.exists() {
            return Err(Error::config(format!(
                "Vault directory does not exist: {}",
                self.vault_dir.display()
            )));
        }

        if !self.vault_dir.is_dir() {
            return Err(Error::config(format!(
                "Vault path is not a directory: {}",
                self.vault_dir.display()
            )));
        }

        if self.output_dir.is_file() {
            return Err(Error::config(format!(
                "Output path is a file: {}",
                self.output_dir.display()
            )));
        }

        if self.latex_program.trim().is_empty() {
            return Err(Error::config("latex_program must not be empty"));
        }

        if self.output_subdir.trim().is_empty() || self.aux_subdir.trim().is_empty() {
            return Err(Error::config(
                "output_subdir and aux_subdir must not be empty",
            ));
        }

        // An unreadable template is tolerated and replaced at load time.
        if let Some(ref template_path) = self.template_path {
            if template_path.is_file() {
                crate::template_validator::TemplateValidator::validate_template(template_path)?;
            } else {
                tracing::warn!(
                    "Template file does not exist: {}",
                    template_path.display()
                );
            }
        }

        Ok(())
    }

    /// Returns the directory handed to the typesetter for style files.
    #[must_use]
    pub fn effective_include_dir(&self) -> &Path {
        self.include_dir.as_deref().unwrap_or(&self.output_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            generate_pdf: true,
            latex_program: DEFAULT_LATEX_PROGRAM.to_string(),
            template_path: None,
            include_dir: None,
            output_subdir: DEFAULT_OUTPUT_SUBDIR.to_string(),
            aux_subdir: DEFAULT_AUX_SUBDIR.to_string(),
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    vault_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    generate_pdf: Option<bool>,
    latex_program: Option<String>,
    template_path: Option<PathBuf>,
    include_dir: Option<PathBuf>,
    output_subdir: Option<String>,
    aux_subdir: Option<String>,
}

impl ConfigBuilder {
    /// Sets the vault root.
    #[must_use]
    pub fn vault_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.vault_dir = Some(path.into());
        self
    }

    /// Sets the output directory for the generated document.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enables or disables PDF generation.
    #[must_use]
    pub fn generate_pdf(mut self, enabled: bool) -> Self {
        self.generate_pdf = Some(enabled);
        self
    }

    /// Sets the typesetting executable (default `pdflatex`).
    #[must_use]
    pub fn latex_program(mut self, program: impl Into<String>) -> Self {
        self.latex_program = Some(program.into());
        self
    }

    /// Sets the path to an external document template.
    ///
    /// The template must contain the `% bottleneck_insert` marker exactly once.
    #[must_use]
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Sets the include directory passed to the typesetter.
    #[must_use]
    pub fn include_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(path.into());
        self
    }

    /// Sets the PDF and auxiliary subdirectories below the output directory.
    #[must_use]
    pub fn subdirs(mut self, output: impl Into<String>, aux: impl Into<String>) -> Self {
        self.output_subdir = Some(output.into());
        self.aux_subdir = Some(aux.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            vault_dir: normalize_path(&self.vault_dir.unwrap_or_else(|| PathBuf::from("."))),
            output_dir: normalize_path(&self.output_dir.unwrap_or_else(|| PathBuf::from("."))),
            generate_pdf: self.generate_pdf.unwrap_or(true),
            latex_program: self
                .latex_program
                .unwrap_or_else(|| DEFAULT_LATEX_PROGRAM.to_string()),
            template_path: self.template_path.as_deref().map(normalize_path),
            include_dir: self.include_dir.as_deref().map(normalize_path),
            output_subdir: self
                .output_subdir
                .unwrap_or_else(|| DEFAULT_OUTPUT_SUBDIR.to_string()),
            aux_subdir: self
                .aux_subdir
                .unwrap_or_else(|| DEFAULT_AUX_SUBDIR.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Makes `path` absolute and collapses `.` and `..` segments.
///
/// The filesystem is not consulted, so the path does not need to exist and
/// symbolic links are left alone.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
