use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error types for the bottleneck library.
///
/// Expected failures of a run (missing notes, malformed entries) are not
/// errors; they are reported through [`SelectionOutcome`](crate::SelectionOutcome)
/// and [`AssemblyOutcome`](crate::AssemblyOutcome).
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Template rendering error.
    #[error("Failed to render template '{template}': {message}")]
    Template {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// Document template rejected before use.
    #[error("Invalid template '{template}': {message}")]
    TemplateValidation {
        /// Template path
        template: String,
        /// Reason for rejection
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Persisted settings could not be read or written.
    #[error("Settings file '{path}' is unusable: {message}")]
    Settings {
        /// Location of the settings file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// The typesetting executable could not be started.
    #[error("Failed to run '{program}': {message}")]
    Render {
        /// Executable name
        program: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a template error.
    #[must_use]
    pub fn template(template: impl Into<String>, source: &tera::Error) -> Self {
        // tera hides the useful part of the message in the source chain
        let mut message = source.to_string();
        let mut cause = source.source();
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }

        Self::Template {
            template: template.into(),
            message,
        }
    }

    /// Creates a template validation error.
    #[must_use]
    pub fn template_validation(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateValidation {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Creates a settings error.
    #[must_use]
    pub fn settings(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Settings {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Creates a render error for a process that failed to start.
    #[must_use]
    pub fn render(program: impl Into<String>, source: &std::io::Error) -> Self {
        Self::Render {
            program: program.into(),
            message: source.to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if the typesetting executable could not be started.
    #[must_use]
    pub const fn is_render(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}
