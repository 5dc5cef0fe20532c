//! Error types for code generation

use std::path::PathBuf;
use thiserror::Error;

/// A malformed type reference in the input schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("empty type name referenced from module `{module}`")]
    EmptyTypeName { module: String },

    #[error("invalid module path `{0}`")]
    InvalidModulePath(String),

    #[error("invalid type name `{0}`")]
    InvalidTypeName(String),

    #[error("unresolved type `{0}`")]
    UnresolvedType(String),
}

/// Template parsing, rendering, or loading failure
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("template `{template}` line {line}: {reason}")]
    Parse {
        template: String,
        line: usize,
        reason: String,
    },

    #[error("template `{template}` has no binding for placeholder `{placeholder}`")]
    Unbound {
        template: String,
        placeholder: String,
    },

    #[error("reading template {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why one schema file could not be generated
#[derive(Error, Debug)]
pub enum GenerateErrorKind {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Generation failure for a single schema file
///
/// Other files in the same run are unaffected.
#[derive(Error, Debug)]
#[error("{file}: {kind}")]
pub struct GenerateError {
    pub file: String,
    #[source]
    pub kind: GenerateErrorKind,
}

impl GenerateError {
    /// Attach the failing file name to an error
    pub fn new(file: impl Into<String>, kind: impl Into<GenerateErrorKind>) -> Self {
        Self {
            file: file.into(),
            kind: kind.into(),
        }
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
