use crate::{
    assembler::{Assembler, AssemblyOutcome, AssemblyReport},
    config::Config,
    error::Result,
    render::{RenderInvoker, RenderStatus},
    selector::{Selection, SelectionOutcome, Selector},
};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// Selection did not succeed; nothing was written.
    Stopped(SelectionOutcome),

    /// The document was written.
    Assembled {
        /// The notes that were selected
        selection: Selection,
        /// What the assembler wrote
        report: AssemblyReport,
        /// Typesetting result, `None` when PDF generation was disabled
        render: Option<RenderStatus>,
        /// Total execution time
        duration: Duration,
    },
}

impl RunReport {
    /// Returns true if every note made it into the document and the
    /// typesetter, if run, exited cleanly.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Stopped(_) => false,
            Self::Assembled { report, render, .. } => {
                report.outcome.is_success() && render.is_none_or(RenderStatus::is_success)
            }
        }
    }

    /// Prints a human-readable report to stdout.
    ///
    /// Failures always list every offending path.
    pub fn print_summary(&self, vault_dir: &Path) {
        match self {
            Self::Stopped(SelectionOutcome::FileNotFound(path)) => {
                println!("File not found: {}", path.display());
            }
            Self::Stopped(SelectionOutcome::NoReferencesFound(path)) => {
                println!("No file links were found in {}", path.display());
            }
            Self::Stopped(SelectionOutcome::MissingFiles(paths)) => {
                println!("Missing files:");
                for path in paths {
                    println!("  {}", path.display());
                }
            }
            Self::Stopped(SelectionOutcome::Success(_)) => {}
            Self::Assembled {
                selection,
                report,
                render,
                duration,
            } => {
                for name in &report.entries {
                    println!("\tFound: {name}");
                }
                println!(
                    "Generated {} ({} of {} entries) in {:.2}s",
                    report.document.display(),
                    report.entries.len(),
                    selection.paths.len(),
                    duration.as_secs_f64()
                );

                if let AssemblyOutcome::PartialFailure(rejected) = &report.outcome {
                    println!("Bad files:");
                    for entry in rejected {
                        let shown = pathdiff::diff_paths(&entry.path, vault_dir)
                            .unwrap_or_else(|| entry.path.clone());
                        println!("  {}: {}", shown.display(), entry.error);
                    }
                }

                match render {
                    Some(status) if status.is_success() => println!("PDF generated"),
                    Some(RenderStatus { code: Some(code) }) => {
                        println!("Typesetting exited with code {code}");
                    }
                    Some(RenderStatus { code: None }) => println!("Typesetting was interrupted"),
                    None => {}
                }
            }
        }
    }
}

/// Main pipeline orchestrator: select, assemble, render.
pub struct Pipeline {
    config: Config,
    selector: Selector,
    assembler: Assembler,
    renderer: RenderInvoker,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - Assembler initialization fails
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let selector = Selector::new(&config.vault_dir);
        let assembler = Assembler::new(&config)?;
        let renderer = RenderInvoker::new(&config.latex_program);

        Ok(Self {
            config,
            selector,
            assembler,
            renderer,
        })
    }

    /// Runs the pipeline for one tasting file.
    ///
    /// # Process
    ///
    /// 1. **Select**: resolve and check every linked note
    /// 2. **Assemble**: parse notes and write the `.tex` document
    /// 3. **Render**: run the typesetter, if enabled
    ///
    /// Each stage runs only when the previous one produced output.
    ///
    /// # Errors
    ///
    /// Returns an error if the tasting file or document cannot be accessed, or
    /// the typesetter cannot be started.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bottleneck::{Config, Pipeline};
    /// use std::path::Path;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .vault_dir("./vault")
    ///     .generate_pdf(false)
    ///     .build()?;
    ///
    /// let report = Pipeline::new(config)?.run(Path::new("./vault/Herbst.md"))?;
    /// report.print_summary(Path::new("./vault"));
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(vault_dir = %self.config.vault_dir.display()))]
    pub fn run(&self, tasting_file: &Path) -> Result<RunReport> {
        let start_time = Instant::now();

        info!("Stage 1/3: Selecting notes...");
        let selection = match self.selector.select(tasting_file)? {
            SelectionOutcome::Success(selection) => selection,
            other => {
                warn!("Selection stopped: {:?}", other);
                return Ok(RunReport::Stopped(other));
            }
        };
        info!("✓ Selected {} notes", selection.paths.len());

        info!("Stage 2/3: Assembling document...");
        let report = self
            .assembler
            .assemble(&selection.paths, &selection.base_name)?;
        info!("✓ Wrote {}", report.document.display());

        let render = if !self.config.generate_pdf {
            info!("Stage 3/3: Skipped, PDF generation disabled");
            None
        } else if report.entries.is_empty() {
            warn!("Stage 3/3: Skipped, no entry made it into the document");
            None
        } else {
            info!("Stage 3/3: Generating PDF...");
            let status = self.renderer.render(
                &report.document,
                self.config.effective_include_dir(),
                &self.config.output_dir.join(&self.config.output_subdir),
                &self.config.output_dir.join(&self.config.aux_subdir),
            )?;
            if !status.is_success() {
                warn!("{} exited with {:?}", self.config.latex_program, status.code);
            }
            Some(status)
        };

        let duration = start_time.elapsed();
        info!(
            "✓ Pipeline completed in {:.2}s",
            duration.as_secs_f64()
        );

        Ok(RunReport::Assembled {
            selection,
            report,
            render,
            duration,
        })
    }
}
