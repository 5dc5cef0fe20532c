//! busbridge-codegen - Generate message-bus adaptors from service schemas
//!
//! # Architecture
//!
//! ```text
//! SchemaFile
//!     ↓
//!  [SchemaWalker] ──→ [ImportSet::resolve]
//!     ↓                     ↓
//!  [CodeSynthesizer] ← templates (*.tmpl)
//!     ↓
//!  GeneratedFile ──→ write_atomic
//! ```
//!
//! Each schema file is processed on its own: a malformed type reference or a
//! broken template fails that file and leaves the rest of the batch intact.
//!
//! # Usage
//!
//! ```
//! use busbridge_codegen::{Generator, GeneratorOptions, Method, SchemaFile, Service};
//!
//! let file = SchemaFile::new("example/example.proto", "example", "crate::example", "example/example");
//! let request = file.local_type("HelloRequest");
//! let reply = file.local_type("HelloReply");
//! let file = file.with_service(
//!     Service::new("Greeter").with_method(Method::new("SayHello", request, reply)),
//! );
//!
//! let report = Generator::new(GeneratorOptions::default()).generate(&[file]);
//! assert!(report.is_success());
//! assert_eq!(report.files[0].name, "example/example-bus-adaptor.rs");
//! ```

mod error;
mod generator;
mod imports;
pub mod naming;
mod schema;
mod synth;
mod template;
mod walker;

pub use error::{GenerateError, GenerateErrorKind, SchemaError, SynthesisError};
pub use generator::{
    DEFAULT_SUFFIX, GeneratedFile, GenerationReport, Generator, GeneratorOptions, write_atomic,
};
pub use imports::{BASE_IMPORTS, ImportEntry, ImportSet};
pub use schema::{
    Field, FieldType, Message, Method, ScalarType, SchemaFile, Service, TypeRef,
    validate_module_path,
};
pub use synth::CodeSynthesizer;
pub use template::{Bindings, ParsedTemplates, Template, TemplateKind, TemplateSet};
pub use walker::{MethodRef, Messages, SchemaWalker};
