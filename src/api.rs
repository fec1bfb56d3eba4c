//! # Quick Start API
//!
//! One-call entry point for turning a tasting file into a document without
//! building a [`Config`] by hand.
//!
//! ## Examples
//!
//! ```no_run
//! use bottleneck::api::Tasting;
//!
//! // LaTeX only, next to the tasting file
//! Tasting::file("./vault/Herbst.md")
//!     .vault("./vault")
//!     .tex_only()
//!     .run()?;
//!
//! // Full PDF into a separate directory
//! Tasting::file("./vault/Herbst.md")
//!     .vault("./vault")
//!     .output("./booklets")
//!     .latex("lualatex")
//!     .run()?;
//! # Ok::<(), bottleneck::Error>(())
//! ```

use crate::{Config, Pipeline, Result, RunReport};
use std::path::PathBuf;

/// Builder for a single tasting run.
#[derive(Debug, Clone)]
#[must_use = "call .run() to generate the document"]
pub struct Tasting {
    file: PathBuf,
    vault: Option<PathBuf>,
    output: Option<PathBuf>,
    generate_pdf: bool,
    latex: Option<String>,
    template: Option<PathBuf>,
}

impl Tasting {
    /// Starts a run for the given tasting file.
    ///
    /// The vault defaults to the tasting file's directory and the output
    /// directory to the vault.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: path.into(),
            vault: None,
            output: None,
            generate_pdf: true,
            latex: None,
            template: None,
        }
    }

    /// Sets the vault root that links are resolved against.
    pub fn vault(mut self, path: impl Into<PathBuf>) -> Self {
        self.vault = Some(path.into());
        self
    }

    /// Sets the output directory.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Writes the `.tex` document but skips the typesetter.
    pub fn tex_only(mut self) -> Self {
        self.generate_pdf = false;
        self
    }

    /// Uses a different typesetting program.
    pub fn latex(mut self, program: impl Into<String>) -> Self {
        self.latex = Some(program.into());
        self
    }

    /// Uses a custom document template.
    pub fn template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    /// Executes the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a fatal IO error
    /// occurs. Missing notes and malformed entries are reported in the
    /// returned [`RunReport`] instead.
    pub fn run(self) -> Result<RunReport> {
        let file = self.file.clone();
        Pipeline::new(self.build_config()?)?.run(&file)
    }

    fn build_config(self) -> Result<Config> {
        let vault = self.vault.unwrap_or_else(|| {
            self.file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
        });
        let output = self.output.unwrap_or_else(|| vault.clone());

        let mut builder = Config::builder()
            .vault_dir(vault)
            .output_dir(output)
            .generate_pdf(self.generate_pdf);

        if let Some(latex) = self.latex {
            builder = builder.latex_program(latex);
        }
        if let Some(template) = self.template {
            builder = builder.template_path(template);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn tasting_defaults_to_file_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Tasting::file(temp.path().join("Herbst.md"))
            .build_config()
            .unwrap();

        assert_eq!(config.vault_dir, temp.path());
        assert_eq!(config.output_dir, temp.path());
        assert!(config.generate_pdf);
    }

    #[test]
    fn tasting_builder_is_fluent() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Tasting::file("Herbst.md")
            .vault(temp.path())
            .output(temp.path().join("out"))
            .latex("lualatex")
            .tex_only()
            .build_config()
            .unwrap();

        assert_eq!(config.output_dir, temp.path().join("out"));
        assert_eq!(config.latex_program, "lualatex");
        assert!(!config.generate_pdf);
    }

    #[test]
    fn tasting_run_writes_document() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("A.md")
            .write_str(
                "# A\n- [ ] Kühlgefiltert\n- [ ] Gefärbt\n- Typ: Grain\n- Region: Lowlands\n\
                 - Destillerie: Girvan\n- Alter: 25 Jahre\n- Stärke: 42,8% vol.\n- Reifung: Bourbon\n",
            )
            .unwrap();
        temp.child("Herbst.md").write_str("- [[A]]\n").unwrap();

        let report = Tasting::file(temp.path().join("Herbst.md"))
            .tex_only()
            .run()
            .unwrap();

        assert!(report.is_success());
        let document = std::fs::read_to_string(temp.path().join("Herbst.tex")).unwrap();
        assert!(document.contains("{42.8}"));
    }

    #[test]
    fn tasting_with_invalid_vault_fails() {
        let result = Tasting::file("Herbst.md")
            .vault("/nonexistent/vault/for/bottleneck")
            .run();
        assert!(result.is_err());
    }
}
