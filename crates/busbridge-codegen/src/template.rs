//! Declarative templates for generated code
//!
//! Templates are plain text with `{{name}}` placeholders. They carry no
//! control flow: the synthesizer renders smaller templates in loops and binds
//! the results into larger ones.

use crate::error::SynthesisError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// The templates one artifact is assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateKind {
    File,
    Service,
    ServerMethod,
    Endpoint,
    Handler,
    ClientMethod,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::File,
        TemplateKind::Service,
        TemplateKind::ServerMethod,
        TemplateKind::Endpoint,
        TemplateKind::Handler,
        TemplateKind::ClientMethod,
    ];

    /// Template name used in errors and file names
    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::File => "file",
            TemplateKind::Service => "service",
            TemplateKind::ServerMethod => "server_method",
            TemplateKind::Endpoint => "endpoint",
            TemplateKind::Handler => "handler",
            TemplateKind::ClientMethod => "client_method",
        }
    }

    /// File name inside a template directory
    pub fn file_name(self) -> String {
        format!("{}.tmpl", self.name())
    }

    fn embedded(self) -> &'static str {
        match self {
            TemplateKind::File => include_str!("../templates/file.tmpl"),
            TemplateKind::Service => include_str!("../templates/service.tmpl"),
            TemplateKind::ServerMethod => include_str!("../templates/server_method.tmpl"),
            TemplateKind::Endpoint => include_str!("../templates/endpoint.tmpl"),
            TemplateKind::Handler => include_str!("../templates/handler.tmpl"),
            TemplateKind::ClientMethod => include_str!("../templates/client_method.tmpl"),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Template sources, embedded or loaded from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    sources: BTreeMap<TemplateKind, String>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::embedded()
    }
}

impl TemplateSet {
    /// The templates shipped with this crate
    pub fn embedded() -> Self {
        let sources = TemplateKind::ALL
            .iter()
            .map(|kind| (*kind, kind.embedded().to_string()))
            .collect();
        Self { sources }
    }

    /// Override embedded templates with `<name>.tmpl` files found in `dir`
    pub fn from_dir(dir: &Path) -> Result<Self, SynthesisError> {
        let mut set = Self::embedded();
        for kind in TemplateKind::ALL {
            let path = dir.join(kind.file_name());
            if !path.is_file() {
                continue;
            }
            let source = std::fs::read_to_string(&path)
                .map_err(|source| SynthesisError::Io { path: path.clone(), source })?;
            tracing::debug!(template = %kind, path = ?path, "template override loaded");
            set.sources.insert(kind, source);
        }
        Ok(set)
    }

    /// Replace one template source
    pub fn with_source(mut self, kind: TemplateKind, source: impl Into<String>) -> Self {
        self.sources.insert(kind, source.into());
        self
    }

    /// Source text of a template
    pub fn source(&self, kind: TemplateKind) -> &str {
        self.sources
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.embedded())
    }

    /// Parse every template
    pub fn parse(&self) -> Result<ParsedTemplates, SynthesisError> {
        let mut templates = BTreeMap::new();
        for kind in TemplateKind::ALL {
            templates.insert(kind, Template::parse(kind.name(), self.source(kind))?);
        }
        Ok(ParsedTemplates { templates })
    }
}

/// A parsed [`TemplateSet`]
#[derive(Debug, Clone)]
pub struct ParsedTemplates {
    templates: BTreeMap<TemplateKind, Template>,
}

impl ParsedTemplates {
    /// Render one template
    pub fn render(&self, kind: TemplateKind, bindings: &Bindings) -> Result<String, SynthesisError> {
        match self.templates.get(&kind) {
            Some(template) => template.render(bindings),
            None => Err(SynthesisError::Parse {
                template: kind.name().to_string(),
                line: 0,
                reason: "template not loaded".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Placeholder { name: String, line: usize },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`; `name` is used in error messages
    pub fn parse(name: &str, source: &str) -> Result<Self, SynthesisError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut line = 1;

        while let Some(start) = rest.find(OPEN) {
            let (text, tail) = rest.split_at(start);
            line += text.matches('\n').count();
            if !text.is_empty() {
                segments.push(Segment::Text(text.to_string()));
            }

            let tail = &tail[OPEN.len()..];
            let end = tail.find(CLOSE).ok_or_else(|| SynthesisError::Parse {
                template: name.to_string(),
                line,
                reason: "unterminated placeholder".to_string(),
            })?;
            let inner = &tail[..end];
            let placeholder = inner.trim();
            if placeholder.is_empty()
                || !placeholder
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            {
                return Err(SynthesisError::Parse {
                    template: name.to_string(),
                    line,
                    reason: format!("malformed placeholder `{{{{{inner}}}}}`"),
                });
            }
            segments.push(Segment::Placeholder {
                name: placeholder.to_string(),
                line,
            });
            line += inner.matches('\n').count();
            rest = &tail[end + CLOSE.len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { name, .. } => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Substitute every placeholder
    ///
    /// Fails on the first placeholder without a binding; extra bindings are
    /// ignored.
    pub fn render(&self, bindings: &Bindings) -> Result<String, SynthesisError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder { name, .. } => {
                    let value = bindings.get(name).ok_or_else(|| SynthesisError::Unbound {
                        template: self.name.clone(),
                        placeholder: name.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Placeholder values for one render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Bind `name` to `value` in place
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Value bound to `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "template/template_tests.rs"]
mod template_tests;
