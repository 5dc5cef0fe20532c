//! Renders one adaptor artifact per schema file

use crate::error::SynthesisError;
use crate::generator::{GeneratedFile, GeneratorOptions};
use crate::imports::ImportSet;
use crate::naming::{escape_ident, to_snake_case, to_upper_camel};
use crate::schema::{Method, SchemaFile, Service};
use crate::template::{Bindings, ParsedTemplates, TemplateKind, TemplateSet};
use crate::walker::SchemaWalker;
use busbridge_core::subject;

/// Instance placeholder shown in subject documentation
const INSTANCE_DOC: &str = "{instance}";

/// Inherent methods of the generated client that RPC methods must not shadow
const CLIENT_METHODS: &[&str] = &["new", "with_parent_span"];

/// Combines a schema file, its imports, and templates into source code
#[derive(Debug, Clone, Default)]
pub struct CodeSynthesizer {
    templates: TemplateSet,
}

impl CodeSynthesizer {
    pub fn new(templates: TemplateSet) -> Self {
        Self { templates }
    }

    /// The templates in use
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Render the artifact for `file`
    ///
    /// Files without services produce `None`. Rendering happens entirely in
    /// memory; nothing is written.
    pub fn synthesize(
        &self,
        file: &SchemaFile,
        imports: &ImportSet,
        options: &GeneratorOptions,
    ) -> Result<Option<GeneratedFile>, SynthesisError> {
        let walker = SchemaWalker::new(file);
        if !walker.has_services() {
            tracing::debug!(file = %file.name, "no services, skipping");
            return Ok(None);
        }

        let templates = self.templates.parse()?;

        let mut services = String::new();
        for service in walker.services() {
            services.push_str(&render_service(&templates, service, imports)?);
        }

        let content = templates.render(
            TemplateKind::File,
            &Bindings::new()
                .with("generator", options.generator_name.as_str())
                .with("source", file.name.as_str())
                .with("imports", imports.render())
                .with("services", services),
        )?;

        Ok(Some(GeneratedFile {
            name: format!("{}-{}", file.generated_prefix, options.suffix),
            content,
        }))
    }
}

fn render_service(
    templates: &ParsedTemplates,
    service: &Service,
    imports: &ImportSet,
) -> Result<String, SynthesisError> {
    let service_type = to_upper_camel(&service.name);

    let mut server_methods = String::new();
    let mut endpoints = String::new();
    let mut handlers = String::new();
    let mut client_methods = String::new();

    for method in &service.methods {
        let bindings = method_bindings(service, &service_type, method, imports);
        server_methods.push_str(&templates.render(TemplateKind::ServerMethod, &bindings)?);
        endpoints.push_str(&templates.render(TemplateKind::Endpoint, &bindings)?);
        handlers.push_str(&templates.render(TemplateKind::Handler, &bindings)?);
        client_methods.push_str(&templates.render(TemplateKind::ClientMethod, &bindings)?);
    }

    let service_docs = if service.docs.is_empty() {
        String::new()
    } else {
        format!("///\n{}", doc_lines(&service.docs, ""))
    };

    templates.render(
        TemplateKind::Service,
        &Bindings::new()
            .with("service", service_type.as_str())
            .with("service_snake", to_snake_case(&service.name))
            .with("service_lower", service_type.to_lowercase())
            .with("service_docs", service_docs)
            .with("server_methods", server_methods)
            .with("endpoints", endpoints)
            .with("handlers", handlers)
            .with("client_methods", client_methods),
    )
}

fn method_bindings(
    service: &Service,
    service_type: &str,
    method: &Method,
    imports: &ImportSet,
) -> Bindings {
    let method_type = to_upper_camel(&method.name);
    let method_snake = to_snake_case(&method.name);
    let input = imports.qualify(&method.input);
    let output = imports.qualify(&method.output);
    let served_on = subject(service_type, &method_type, Some(INSTANCE_DOC));

    tracing::debug!(
        service = %service.name,
        method = %method.name,
        input = %input,
        output = %output,
        subject = %served_on,
        "method types"
    );

    let mut docs = doc_lines(&method.docs, "    ");
    if !docs.is_empty() {
        docs.push_str("    ///\n");
    }
    docs.push_str(&format!("    /// Served on `{served_on}`.\n"));

    Bindings::new()
        .with("service", service_type)
        .with("method", method_type.as_str())
        .with("method_fn", method_fn(&method_snake))
        .with("method_snake", method_snake.as_str())
        .with("handler", format!("{service_type}{method_type}Handler"))
        .with("input", input)
        .with("output", output)
        .with("docs", docs)
        .with("description", format!("{:?}", method.docs.join(" ").trim()))
}

/// Rust name of a method, suffixed when it would clash with the client API
fn method_fn(method_snake: &str) -> String {
    if CLIENT_METHODS.contains(&method_snake) {
        format!("{method_snake}_")
    } else {
        escape_ident(method_snake)
    }
}

fn doc_lines(docs: &[String], indent: &str) -> String {
    docs.iter()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                format!("{indent}///\n")
            } else {
                format!("{indent}/// {line}\n")
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "synth/synth_tests.rs"]
mod synth_tests;
