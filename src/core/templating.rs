// src/core/templating.rs

//! Placeholder expansion for `krill.toml`.
//!
//! Every string value of the document may reference other fields with
//! `{{ .path.to.field }}`, e.g. `{{ .targets.release.output_dir }}` or
//! `{{ .project.name }}{{ .exe_ext }}`. Placeholders are resolved in a single
//! pass against the raw document plus a few platform-specific extension keys.

use crate::models::BinaryType;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use toml::{Table, Value};

lazy_static! {
    // Segments may contain '-' so qualified target names like `debug-cmake` resolve.
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{\{\s*\.([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)\s*\}\}")
            .expect("placeholder pattern is a valid regex");
}

/// Opening marker; text without it is never expanded.
pub const PLACEHOLDER_MARKER: &str = "{{";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Placeholder '{{{{ .{0} }}}}' does not match any configuration field.")]
    UnknownField(String),
    #[error("Placeholder '{{{{ .{0} }}}}' refers to a table or an array, not a value.")]
    NotAScalar(String),
}

pub fn contains_placeholders(text: &str) -> bool {
    text.contains(PLACEHOLDER_MARKER)
}

/// The name-spaced data placeholders are resolved against.
#[derive(Debug, Clone)]
pub struct TemplateView {
    root: Table,
}

impl TemplateView {
    /// Builds the view from the raw (unexpanded) document for the given OS family.
    pub fn new(document: &Table, os: &str) -> Self {
        let mut root = document.clone();

        let extensions = [
            ("exe_ext", BinaryType::Executable),
            ("dll_ext", BinaryType::DynamicLib),
            ("static_lib_ext", BinaryType::StaticLib),
            ("obj_ext", BinaryType::Object),
            ("shared_lib_ext", BinaryType::SharedLib),
            ("framework_ext", BinaryType::Framework),
        ];
        for (key, binary_type) in extensions {
            if let Some(ext) = binary_type.extension(os) {
                root.insert(key.to_string(), Value::String(ext.to_string()));
            }
        }

        let project_binary_type = document
            .get("project")
            .and_then(|project| project.get("binary_type"))
            .and_then(|value| value.clone().try_into::<BinaryType>().ok())
            .unwrap_or_default();
        if let Some(ext) = project_binary_type.extension(os) {
            root.insert("bin_ext".to_string(), Value::String(ext.to_string()));
        }

        Self { root }
    }

    /// Resolves a dotted path (without the leading dot) to its textual value.
    pub fn lookup(&self, path: &str) -> Result<String, TemplateError> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self
            .root
            .get(first)
            .ok_or_else(|| TemplateError::UnknownField(path.to_string()))?;

        for segment in segments {
            current = current
                .get(segment)
                .ok_or_else(|| TemplateError::UnknownField(path.to_string()))?;
        }

        match current {
            Value::String(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Boolean(b) => Ok(b.to_string()),
            Value::Datetime(d) => Ok(d.to_string()),
            Value::Array(_) | Value::Table(_) => Err(TemplateError::NotAScalar(path.to_string())),
        }
    }

    /// Replaces every placeholder in `template`.
    pub fn expand_str(&self, template: &str) -> Result<String, TemplateError> {
        if !contains_placeholders(template) {
            return Ok(template.to_string());
        }

        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;
        for captures in PLACEHOLDER_RE.captures_iter(template) {
            let (Some(whole), Some(path)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            rendered.push_str(template.get(last..whole.start()).unwrap_or_default());
            rendered.push_str(&self.lookup(path.as_str())?);
            last = whole.end();
        }
        rendered.push_str(template.get(last..).unwrap_or_default());
        Ok(rendered)
    }
}

/// Expands every string value of `document` in place and returns it.
pub fn expand_document(mut document: Table, os: &str) -> Result<Table, TemplateError> {
    let view = TemplateView::new(&document, os);
    for (_, value) in document.iter_mut() {
        expand_value(value, &view)?;
    }
    Ok(document)
}

fn expand_value(value: &mut Value, view: &TemplateView) -> Result<(), TemplateError> {
    match value {
        Value::String(s) => {
            if contains_placeholders(s) {
                *s = view.expand_str(s)?;
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                expand_value(item, view)?;
            }
        }
        Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                expand_value(item, view)?;
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Table {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_expand_target_and_project_fields() {
        let doc = parse(
            r#"
            [project]
            name = "app"

            [targets.release]
            commands = ["go build -o {{ .targets.release.output_dir }}/{{ .project.name }}{{ .exe_ext }}"]
            output_dir = "bin/release"
            "#,
        );

        let expanded = expand_document(doc, "windows").unwrap();
        let command = expanded["targets"]["release"]["commands"][0].as_str().unwrap();
        assert_eq!(command, "go build -o bin/release/app.exe");

        let doc = parse(
            r#"
            [project]
            name = "app"
            [targets.release]
            commands = ["ls {{.project.name}}{{ .exe_ext }}"]
            "#,
        );
        let expanded = expand_document(doc, "linux").unwrap();
        assert_eq!(
            expanded["targets"]["release"]["commands"][0].as_str(),
            Some("ls app")
        );
    }

    #[test]
    fn test_tables_inside_arrays_are_expanded() {
        let doc = parse(
            r#"
            [project]
            name = "app"

            [[extra]]
            label = "{{ .project.name }}-docs"
            "#,
        );
        let expanded = expand_document(doc, "linux").unwrap();
        assert_eq!(expanded["extra"][0]["label"].as_str(), Some("app-docs"));
    }

    #[test]
    fn test_hyphenated_target_names_resolve() {
        let doc = parse(
            r#"
            [targets.debug-cmake]
            commands = ["cmake --build {{ .targets.debug-cmake.output_dir }}"]
            output_dir = "cmake-build-debug"
            "#,
        );
        let expanded = expand_document(doc, "linux").unwrap();
        assert_eq!(
            expanded["targets"]["debug-cmake"]["commands"][0].as_str(),
            Some("cmake --build cmake-build-debug")
        );
    }

    #[test]
    fn test_bin_ext_follows_project_binary_type() {
        let doc = parse(
            r#"
            [project]
            name = "core"
            binary_type = "dynamic_lib"
            "#,
        );
        let view = TemplateView::new(&doc, "macos");
        assert_eq!(view.lookup("bin_ext").unwrap(), ".dylib");
        assert_eq!(view.lookup("framework_ext").unwrap(), ".framework");

        let view = TemplateView::new(&doc, "linux");
        assert_eq!(view.lookup("bin_ext").unwrap(), ".so");
        assert!(matches!(
            view.lookup("framework_ext"),
            Err(TemplateError::UnknownField(_))
        ));
    }

    #[test]
    fn test_unknown_and_non_scalar_placeholders_fail() {
        let doc = parse(
            r#"
            [project]
            name = "app"
            tools = ["cargo"]
            "#,
        );
        let view = TemplateView::new(&doc, "linux");

        assert!(matches!(
            view.expand_str("{{ .project.missing }}"),
            Err(TemplateError::UnknownField(path)) if path == "project.missing"
        ));
        assert!(matches!(
            view.expand_str("{{ .project.tools }}"),
            Err(TemplateError::NotAScalar(_))
        ));
    }

    #[test]
    fn test_text_without_markers_is_untouched() {
        let doc = parse("[project]\nname = \"app\"");
        let view = TemplateView::new(&doc, "linux");
        assert_eq!(view.expand_str("make all").unwrap(), "make all");
        assert!(!contains_placeholders("make all"));
    }
}
