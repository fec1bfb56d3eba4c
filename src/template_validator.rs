use crate::error::{Error, Result};
use crate::template::INSERT_MARKER;
use std::fs;
use std::path::Path;

/// Maximum template file size (1MB)
const MAX_TEMPLATE_SIZE: u64 = 1024 * 1024;

/// Validates external document templates
pub(crate) struct TemplateValidator;

impl TemplateValidator {
    /// Validates an external document template
    ///
    /// Performs the following checks:
    /// 1. File exists and is readable
    /// 2. File size is within limits
    /// 3. Template is not blank
    /// 4. Template contains the insert marker exactly once
    ///
    /// # Errors
    ///
    /// Returns an error if any check fails.
    pub(crate) fn validate_template(path: &Path) -> Result<()> {
        let name = path.to_string_lossy().to_string();

        if !path.exists() {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "Template file not found"),
            ));
        }

        if !path.is_file() {
            return Err(Error::template_validation(name, "Path is not a file"));
        }

        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        if metadata.len() > MAX_TEMPLATE_SIZE {
            return Err(Error::template_validation(
                name,
                format!(
                    "Template file too large: {} bytes (max: {} bytes)",
                    metadata.len(),
                    MAX_TEMPLATE_SIZE
                ),
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        if content.trim().is_empty() {
            return Err(Error::template_validation(name, "Template file is empty"));
        }

        match content.matches(INSERT_MARKER).count() {
            1 => Ok(()),
            0 => Err(Error::template_validation(
                name,
                format!("Template does not contain the '{INSERT_MARKER}' marker"),
            )),
            n => Err(Error::template_validation(
                name,
                format!("Template contains the '{INSERT_MARKER}' marker {n} times, expected once"),
            )),
        }
    }
}
