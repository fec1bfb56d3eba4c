//! Invocation of the external typesetting program.
//!
//! The program is run with MiKTeX-style flags:
//!
//! ```text
//! pdflatex -synctex=1 -output-format=pdf -output-directory=<out>
//!          -aux-directory=<aux> -include-directory=<include> <document>
//! ```
//!
//! Its output goes straight to the terminal and the call blocks until the
//! program exits. There is no timeout.

use crate::error::{Error, Result};
use crate::template::{STYLE_FILE, STYLE_FILE_NAME};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Exit status of the typesetting program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStatus {
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
}

impl RenderStatus {
    /// Returns true if the program exited with code 0.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Runs the typesetting program against an assembled document.
#[derive(Debug, Clone)]
pub struct RenderInvoker {
    program: String,
}

impl RenderInvoker {
    /// Creates an invoker for `program` (e.g. `pdflatex`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Compiles `document`, blocking until the program exits.
    ///
    /// Output and aux directories are created first, and the bundled
    /// `whisxy.sty` is placed in `include_dir` unless a file of that name is
    /// already there. A non-zero exit is returned as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be prepared or the program
    /// cannot be started.
    pub fn render(
        &self,
        document: &Path,
        include_dir: &Path,
        output_dir: &Path,
        aux_dir: &Path,
    ) -> Result<RenderStatus> {
        Self::prepare(include_dir, output_dir, aux_dir)?;

        let args = Self::arguments(document, include_dir, output_dir, aux_dir);
        info!("Running {} on {}", self.program, document.display());
        debug!("Arguments: {:?}", args);

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(parent) = document.parent() {
            command.current_dir(parent);
        }

        let status = command
            .status()
            .map_err(|e| Error::render(&self.program, &e))?;

        debug!("{} exited with {}", self.program, status);
        Ok(RenderStatus {
            code: status.code(),
        })
    }

    /// Builds the argument list; the document path comes last.
    #[must_use]
    pub fn arguments(
        document: &Path,
        include_dir: &Path,
        output_dir: &Path,
        aux_dir: &Path,
    ) -> Vec<OsString> {
        let flag = |name: &str, path: &Path| {
            let mut arg = OsString::from(name);
            arg.push(path.as_os_str());
            arg
        };

        vec![
            OsString::from("-synctex=1"),
            OsString::from("-output-format=pdf"),
            flag("-output-directory=", output_dir),
            flag("-aux-directory=", aux_dir),
            flag("-include-directory=", include_dir),
            document.as_os_str().to_owned(),
        ]
    }

    fn prepare(include_dir: &Path, output_dir: &Path, aux_dir: &Path) -> Result<()> {
        for dir in [include_dir, output_dir, aux_dir] {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }

        let style = include_dir.join(STYLE_FILE_NAME);
        if !style.exists() {
            fs::write(&style, STYLE_FILE).map_err(|e| Error::io(&style, e))?;
            debug!("Installed {}", style.display());
        }

        Ok(())
    }
}
