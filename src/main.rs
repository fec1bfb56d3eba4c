use anyhow::Context;
use bottleneck::{Config, Pipeline, Settings};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "bottleneck",
    version,
    about = "Easily create beautiful pages for whisky tastings",
    long_about = "Easily create beautiful pages for whisky tastings.\n\n\
    Reads a tasting file listing `- [[Whisky]]` links, looks up every linked \
    note in the vault, and renders them into a LaTeX document that is then \
    compiled to PDF. Vault and output directory are remembered between runs.\n\n\
    USAGE EXAMPLES:\n  \
      # Remember the vault once\n  \
      bottleneck --vault ~/vaults/whisky\n\n  \
      # Generate LaTeX and PDF for a tasting\n  \
      bottleneck ~/vaults/whisky/Herbst.md\n\n  \
      # Only write the .tex file into another directory\n  \
      bottleneck --tex-only --output ./booklets Herbst.md"
)]
struct Cli {
    /// Tasting file listing the whiskies to include
    #[arg(value_name = "TASTING_FILE")]
    tasting_file: Option<PathBuf>,

    /// Vault directory containing the whisky notes (saved for later runs)
    #[arg(short, long, value_name = "PATH")]
    vault: Option<PathBuf>,

    /// Output directory for generated files (saved for later runs)
    #[arg(short, long, value_name = "PATH", visible_alias = "output-dir", alias = "out")]
    output: Option<PathBuf>,

    /// Only generate the .tex file, skip PDF generation
    #[arg(short, long)]
    tex_only: bool,

    /// Typesetting program used to build the PDF
    #[arg(long, default_value = "pdflatex", value_name = "PROGRAM")]
    latex: String,

    /// Custom document template containing `% bottleneck_insert`
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Settings file location
    #[arg(long, env = "BOTTLENECK_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn try_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let settings_path = match cli.config {
        Some(path) => path,
        None => Settings::default_path().context("Failed to locate settings")?,
    };
    let mut settings = Settings::load(&settings_path).context("Failed to load settings")?;

    if let Some(vault) = &cli.vault {
        settings.set_vault(vault).context("Invalid vault path")?;
    }
    if let Some(output) = &cli.output {
        settings.set_output(output).context("Invalid output path")?;
    }
    settings.update().context("Failed to normalize settings")?;

    println!("Vault Directory: {}", settings.vault_path);
    println!("Output Directory: {}", settings.output_directory);
    settings
        .save(&settings_path)
        .context("Failed to save settings")?;
    println!("Configurations saved");

    let Some(tasting_file) = cli.tasting_file else {
        println!("No tasting file was set");
        return Ok(ExitCode::SUCCESS);
    };

    let vault = settings.vault();
    let tasting_file = resolve_tasting_file(&tasting_file, &vault);

    let mut builder = Config::builder()
        .vault_dir(&vault)
        .output_dir(settings.output())
        .generate_pdf(!cli.tex_only)
        .latex_program(cli.latex);
    if let Some(template) = cli.template {
        builder = builder.template_path(template);
    }
    let config = builder.build().context("Failed to build configuration")?;

    println!("Extracting data from: {}", tasting_file.display());
    let report = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run(&tasting_file)
        .context("Pipeline execution failed")?;

    report.print_summary(&vault);

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Falls back to the vault for relative names that do not exist as given.
fn resolve_tasting_file(path: &Path, vault: &Path) -> PathBuf {
    if path.is_relative() && !path.exists() {
        let in_vault = vault.join(path);
        if in_vault.exists() {
            return in_vault;
        }
    }
    path.to_path_buf()
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("bottleneck=warn"),
        1 => EnvFilter::new("bottleneck=info"),
        2 => EnvFilter::new("bottleneck=debug"),
        _ => EnvFilter::new("bottleneck=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
