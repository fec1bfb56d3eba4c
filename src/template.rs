use crate::{
    config::Config,
    entry::WhiskyEntry,
    error::{Error, Result},
};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use tera::{Context, Tera, Value};
use tracing::{debug, warn};

/// Marker in the document template that receives the rendered entries.
pub const INSERT_MARKER: &str = "% bottleneck_insert";

/// Shown in place of a field that is blank in the note.
pub const UNKNOWN_VALUE: &str = "Keine Angabe";

/// Name under which the entry snippet is registered.
const ENTRY_TEMPLATE: &str = "entry.tex";

/// Bundled document template.
pub(crate) const DOCUMENT_TEMPLATE: &str = include_str!("../templates/template.tex");

/// Bundled LaTeX style providing the `\whiskey` command.
pub(crate) const STYLE_FILE: &str = include_str!("../templates/whisxy.sty");

/// File name of the bundled style.
pub(crate) const STYLE_FILE_NAME: &str = "whisxy.sty";

#[derive(Serialize)]
struct EntryContext<'a> {
    entry: &'a WhiskyEntry,
}

/// Renders entries into LaTeX fragments and fragments into the document.
pub(crate) struct TemplateEngine {
    tera: Tera,
    document: String,
}

impl TemplateEngine {
    /// Creates a new template engine from configuration.
    ///
    /// A configured document template that cannot be read is replaced by a
    /// marker-only document.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry snippet fails to compile.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_template(ENTRY_TEMPLATE, include_str!("../templates/entry.tera"))
            .map_err(|e| Error::template(ENTRY_TEMPLATE, &e))?;
        tera.register_filter("latex_escape", Self::latex_escape_filter);
        tera.register_filter("or_unknown", Self::or_unknown_filter);

        let document = match &config.template_path {
            Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
                warn!(
                    "Cannot read template {} ({}), falling back to a bare insert marker",
                    path.display(),
                    e
                );
                INSERT_MARKER.to_string()
            }),
            None => DOCUMENT_TEMPLATE.to_string(),
        };

        Ok(Self { tera, document })
    }

    /// Escapes characters that LaTeX treats specially.
    fn latex_escape_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        match value.as_str() {
            Some(s) => Ok(Value::String(latex_escape(s))),
            None => Ok(value.clone()),
        }
    }

    /// Replaces blank strings by [`UNKNOWN_VALUE`].
    fn or_unknown_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        match value.as_str() {
            Some(s) if s.trim().is_empty() => Ok(Value::String(UNKNOWN_VALUE.to_string())),
            _ => Ok(value.clone()),
        }
    }

    /// Renders a single entry into its `\whiskey{...}` fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub(crate) fn render_entry(&self, entry: &WhiskyEntry) -> Result<String> {
        let context = Context::from_serialize(EntryContext { entry })
            .map_err(|e| Error::template(ENTRY_TEMPLATE, &e))?;

        let rendered = self
            .tera
            .render(ENTRY_TEMPLATE, &context)
            .map_err(|e| Error::template(ENTRY_TEMPLATE, &e))?;

        debug!("Rendered fragment for {}", entry.name);
        Ok(rendered.trim_end().to_string())
    }

    /// Substitutes the joined fragments into the document template.
    ///
    /// Only the first marker is replaced.
    pub(crate) fn render_document(&self, fragments: &[String]) -> String {
        self.document.replacen(INSERT_MARKER, &fragments.join("\n\n"), 1)
    }
}

/// Escapes `text` for use inside a LaTeX argument.
#[must_use]
pub fn latex_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            '\\' => escaped.push_str(r"\textbackslash{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn create_test_config(template: Option<&std::path::Path>) -> (assert_fs::TempDir, Config) {
        let temp = assert_fs::TempDir::new().unwrap();
        let mut builder = Config::builder()
            .vault_dir(temp.path())
            .output_dir(temp.path().join("out"));
        if let Some(path) = template {
            builder = builder.template_path(path);
        }
        let config = builder.build().unwrap();
        (temp, config)
    }

    fn create_test_entry() -> WhiskyEntry {
        WhiskyEntry {
            name: "Glen Scotia 15".to_string(),
            chill_filtered: false,
            coloured: true,
            kind: "Single Malt".to_string(),
            region: "Campbeltown".to_string(),
            distillery: "Glen Scotia".to_string(),
            age: "15 Jahre".to_string(),
            abv: "46".to_string(),
            casks: "Bourbon, Oloroso".to_string(),
        }
    }

    #[test]
    fn test_template_engine_creation() {
        let (_temp, config) = create_test_config(None);
        assert!(TemplateEngine::new(&config).is_ok());
    }

    #[test]
    fn test_render_entry() {
        let (_temp, config) = create_test_config(None);
        let engine = TemplateEngine::new(&config).unwrap();

        let fragment = engine.render_entry(&create_test_entry()).unwrap();
        assert_eq!(
            fragment,
            "\\whiskey{Glen Scotia 15}\n\
             {Single Malt}\n\
             {46}\n\
             {Nicht kühlgefiltert, mit Zuckercouleur}\n\
             {Glen Scotia (Campbeltown)}\n\
             {15 Jahre}\n\
             {Bourbon, Oloroso}"
        );
    }

    #[test]
    fn test_render_entry_blank_fields() {
        let (_temp, config) = create_test_config(None);
        let engine = TemplateEngine::new(&config).unwrap();

        let mut entry = create_test_entry();
        entry.kind = String::new();
        entry.age = "  ".to_string();
        entry.casks = String::new();
        entry.region = String::new();

        let fragment = engine.render_entry(&entry).unwrap();
        assert_eq!(
            fragment,
            "\\whiskey{Glen Scotia 15}\n\
             {Keine Angabe}\n\
             {46}\n\
             {Nicht kühlgefiltert, mit Zuckercouleur}\n\
             {Glen Scotia (Keine Angabe)}\n\
             {Keine Angabe}\n\
             {Keine Angabe}"
        );
    }

    #[test]
    fn test_or_unknown_filter_keeps_values() {
        let kept = TemplateEngine::or_unknown_filter(&Value::String("Islay".into()), &HashMap::new())
            .unwrap();
        assert_eq!(kept, Value::String("Islay".into()));

        let blank = TemplateEngine::or_unknown_filter(&Value::String(" ".into()), &HashMap::new())
            .unwrap();
        assert_eq!(blank, Value::String(UNKNOWN_VALUE.into()));
    }

    #[test]
    fn test_render_entry_phrases() {
        let (_temp, config) = create_test_config(None);
        let engine = TemplateEngine::new(&config).unwrap();

        let mut entry = create_test_entry();
        entry.chill_filtered = true;
        entry.coloured = false;

        let fragment = engine.render_entry(&entry).unwrap();
        assert!(fragment.contains("{Kühlgefiltert, ohne Farbstoff}"));
    }

    #[test]
    fn test_render_entry_escapes_fields() {
        let (_temp, config) = create_test_config(None);
        let engine = TemplateEngine::new(&config).unwrap();

        let mut entry = create_test_entry();
        entry.name = "Benromach & Co_1".to_string();

        let fragment = engine.render_entry(&entry).unwrap();
        assert!(fragment.starts_with("\\whiskey{Benromach \\& Co\\_1}"));
    }

    #[test]
    fn test_render_document_replaces_marker() {
        let (_temp, config) = create_test_config(None);
        let engine = TemplateEngine::new(&config).unwrap();

        let document = engine.render_document(&["A".to_string(), "B".to_string()]);
        assert!(!document.contains(INSERT_MARKER));
        assert!(document.contains("A\n\nB"));
        assert!(document.contains("\\usepackage{whisxy}"));
    }

    #[test]
    fn test_custom_document_template() {
        let temp = assert_fs::TempDir::new().unwrap();
        let template = temp.child("custom.tex");
        template
            .write_str("\\begin{document}\n% bottleneck_insert\n\\end{document}\n")
            .unwrap();

        let (_temp, config) = create_test_config(Some(template.path()));
        let engine = TemplateEngine::new(&config).unwrap();

        let document = engine.render_document(&["X".to_string()]);
        assert_eq!(document, "\\begin{document}\nX\n\\end{document}\n");
    }

    #[test]
    fn test_unreadable_template_falls_back_to_marker() {
        let temp = assert_fs::TempDir::new().unwrap();
        let (_temp, config) = create_test_config(Some(temp.path().join("missing.tex").as_path()));
        let engine = TemplateEngine::new(&config).unwrap();

        assert_eq!(engine.render_document(&["X".to_string()]), "X");
    }

    #[test]
    fn test_latex_escape() {
        assert_eq!(latex_escape("50% & $5 #1_a"), r"50\% \& \$5 \#1\_a");
        assert_eq!(latex_escape(r"a\b"), r"a\textbackslash{}b");
        assert_eq!(latex_escape("~^"), r"\textasciitilde{}\textasciicircum{}");
        assert_eq!(latex_escape("Kühlgefiltert"), "Kühlgefiltert");
    }

    #[test]
    fn test_latex_escape_filter_ignores_non_strings() {
        let value = Value::Bool(true);
        let result = TemplateEngine::latex_escape_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(result, Value::Bool(true));
    }
}
