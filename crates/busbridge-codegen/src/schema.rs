//! Decoded schema model consumed by the generator
//!
//! A frontend (the protoc plugin, a build script, a test) builds these values;
//! the generator only reads them.

use crate::error::SchemaError;
use crate::naming::is_identifier;

/// One schema source file and everything it declares
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaFile {
    /// Source path, e.g. `example/example.proto`
    pub name: String,

    /// Schema package, e.g. `example`
    pub package: String,

    /// Rust module the file's types live in, e.g. `crate::example`
    pub module: String,

    /// Artifact name prefix, e.g. `example/example`
    pub generated_prefix: String,

    pub messages: Vec<Message>,
    pub services: Vec<Service>,
}

impl SchemaFile {
    /// Create an empty file description
    pub fn new(
        name: impl Into<String>,
        package: impl Into<String>,
        module: impl Into<String>,
        generated_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            module: module.into(),
            generated_prefix: generated_prefix.into(),
            messages: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Add a top-level message
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add a service
    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    /// Reference to a type declared in this file's module
    pub fn local_type(&self, name: impl Into<String>) -> TypeRef {
        TypeRef::new(self.module.clone(), name)
    }
}

/// A message and the messages nested inside it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    pub nested: Vec<Message>,
}

impl Message {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a field
    pub fn with_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
        });
        self
    }

    /// Add a nested message
    pub fn with_nested(mut self, message: Message) -> Self {
        self.nested.push(message);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

/// Protobuf scalar value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Message(TypeRef),
    Enum(TypeRef),
}

impl FieldType {
    /// The referenced named type, if this is not a scalar
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            FieldType::Scalar(_) => None,
            FieldType::Message(ty) | FieldType::Enum(ty) => Some(ty),
        }
    }
}

/// A named type together with the module that declares it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    /// Module path, e.g. `crate::common` or `::prost_types`
    pub module: String,

    /// Path relative to `module`, e.g. `Metadata` or `outer::Inner`
    pub name: String,
}

impl TypeRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Fully qualified path
    pub fn full_path(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }

    /// Reject references that cannot be rendered as a Rust path
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_module_path(&self.module)?;

        if self.name.is_empty() {
            return Err(SchemaError::EmptyTypeName {
                module: self.module.clone(),
            });
        }
        if !self.name.split("::").all(is_identifier) {
            return Err(SchemaError::InvalidTypeName(self.name.clone()));
        }
        Ok(())
    }
}

/// Check that `module` is a well-formed path such as `crate::a::b` or `::ext`
pub fn validate_module_path(module: &str) -> Result<(), SchemaError> {
    let relative = module.strip_prefix("::").unwrap_or(module);
    if relative.is_empty() || !relative.split("::").all(is_identifier) {
        return Err(SchemaError::InvalidModulePath(module.to_string()));
    }
    Ok(())
}

/// An RPC service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub methods: Vec<Method>,
    pub docs: Vec<String>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a method
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Set the documentation lines
    pub fn with_docs(mut self, docs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.docs = docs.into_iter().map(Into::into).collect();
        self
    }
}

/// A unary RPC method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub input: TypeRef,
    pub output: TypeRef,
    pub docs: Vec<String>,
}

impl Method {
    pub fn new(name: impl Into<String>, input: TypeRef, output: TypeRef) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            docs: Vec::new(),
        }
    }

    /// Set the documentation lines
    pub fn with_docs(mut self, docs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.docs = docs.into_iter().map(Into::into).collect();
        self
    }
}
