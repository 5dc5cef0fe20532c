//! protoc plugin protocol
//!
//! protoc writes a `CodeGeneratorRequest` to stdin and expects a
//! `CodeGeneratorResponse` on stdout. Per-file failures go into the
//! response's `error` field; only an unreadable request is a hard failure.

use crate::config::Config;
use crate::frontend;
use crate::logging::Logging;
use anyhow::{Context, Result};
use busbridge_codegen::{GenerateError, Generator, GenerationReport, TemplateSet};
use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use std::io::{Read, Write};

/// Read a request from `input`, generate, and write the response to `output`
pub fn run(
    config: &Config,
    logging: &Logging,
    mut input: impl Read,
    mut output: impl Write,
) -> Result<()> {
    let mut buf = Vec::new();
    input
        .read_to_end(&mut buf)
        .context("Failed to read CodeGeneratorRequest")?;
    let request =
        CodeGeneratorRequest::decode(buf.as_slice()).context("Failed to decode CodeGeneratorRequest")?;

    let response = process(config, logging, &request);

    output
        .write_all(&response.encode_to_vec())
        .context("Failed to write CodeGeneratorResponse")?;
    output.flush().context("Failed to flush CodeGeneratorResponse")?;
    Ok(())
}

/// Build the response for a decoded request
pub fn process(
    config: &Config,
    logging: &Logging,
    request: &CodeGeneratorRequest,
) -> CodeGeneratorResponse {
    let mut config = config.clone();
    if let Err(err) = config.apply_parameter(request.parameter()) {
        return failure(format!("{err:#}"));
    }
    if config.debug {
        if let Err(err) = logging.enable_debug() {
            tracing::warn!(reason = %format!("{err:#}"), "debug logging unavailable");
        }
    }

    let generator = match build_generator(&config) {
        Ok(generator) => generator,
        Err(err) => return failure(format!("{err:#}")),
    };

    tracing::info!(files = request.file_to_generate.len(), "generating adaptors");

    let mut report = GenerationReport::default();
    let mut schemas = Vec::new();
    for (name, converted) in frontend::schema_files(request, &config) {
        match converted {
            Ok(schema) => schemas.push(schema),
            Err(err) => {
                tracing::error!(file = %name, reason = %err, "schema conversion failed");
                report.failures.push(GenerateError::new(name, err));
            }
        }
    }

    let generated = generator.generate(&schemas);
    report.files = generated.files;
    report.failures.extend(generated.failures);

    tracing::info!(
        written = report.files.len(),
        failed = report.failures.len(),
        "generation finished"
    );
    into_response(report)
}

fn build_generator(config: &Config) -> Result<Generator> {
    let templates = match &config.templates {
        Some(dir) => TemplateSet::from_dir(dir)
            .with_context(|| format!("Failed to load templates from {dir:?}"))?,
        None => TemplateSet::embedded(),
    };
    Ok(Generator::with_templates(config.generator_options(), templates))
}

fn into_response(report: GenerationReport) -> CodeGeneratorResponse {
    let error = (!report.is_success()).then(|| {
        report
            .failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    });

    CodeGeneratorResponse {
        error,
        supported_features: Some(Feature::Proto3Optional as u64),
        file: report
            .files
            .into_iter()
            .map(|generated| File {
                name: Some(generated.name),
                content: Some(generated.content),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn failure(reason: String) -> CodeGeneratorResponse {
    tracing::error!(reason = %reason, "plugin setup failed");
    CodeGeneratorResponse {
        error: Some(reason),
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    }
}
