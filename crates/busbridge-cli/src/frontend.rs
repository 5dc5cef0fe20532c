//! Descriptor frontend
//!
//! Converts the `FileDescriptorProto`s protoc hands the plugin into the
//! generator's schema model. Type names are resolved against every file in
//! the request (dependencies included) and mapped to the Rust paths prost
//! gives them: package segments become snake_case modules below the module
//! root, nested messages live in a module named after their parent.

use crate::config::Config;
use busbridge_codegen::naming::{escape_ident, to_snake_case, to_upper_camel};
use busbridge_codegen::{
    FieldType, Message, Method, ScalarType, SchemaError, SchemaFile, Service, TypeRef,
};
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::field_descriptor_proto::Type;
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, ServiceDescriptorProto,
    SourceCodeInfo,
};
use std::collections::{BTreeMap, HashMap};

/// `FileDescriptorProto.service`
const SERVICE_FIELD: i32 = 6;

/// `ServiceDescriptorProto.method`
const METHOD_FIELD: i32 = 2;

/// Resolved Rust location of every named type in a request
#[derive(Debug, Default)]
pub struct TypeIndex {
    types: HashMap<String, TypeRef>,
}

impl TypeIndex {
    /// Index every message and enum declared in `files`
    pub fn build(files: &[FileDescriptorProto], modules: &ModuleMapper) -> Self {
        let mut index = Self::default();
        for file in files {
            let module = modules.module_for(file.package());
            let prefix = match file.package() {
                "" => String::new(),
                package => format!(".{package}"),
            };
            for message in &file.message_type {
                index.insert_message(&prefix, &module, &[], message);
            }
            for enumeration in &file.enum_type {
                index.insert(&prefix, &module, &[], enumeration.name());
            }
        }
        index
    }

    fn insert_message(
        &mut self,
        prefix: &str,
        module: &str,
        parents: &[&str],
        message: &DescriptorProto,
    ) {
        self.insert(prefix, module, parents, message.name());

        let mut scope = parents.to_vec();
        scope.push(message.name());
        for nested in &message.nested_type {
            self.insert_message(prefix, module, &scope, nested);
        }
        for enumeration in &message.enum_type {
            self.insert(prefix, module, &scope, enumeration.name());
        }
    }

    fn insert(&mut self, prefix: &str, module: &str, parents: &[&str], name: &str) {
        let mut full_name = prefix.to_string();
        let mut rust_path: Vec<String> = Vec::with_capacity(parents.len() + 1);
        for parent in parents {
            full_name.push('.');
            full_name.push_str(parent);
            rust_path.push(escape_ident(&to_snake_case(parent)));
        }
        full_name.push('.');
        full_name.push_str(name);
        rust_path.push(escape_ident(&to_upper_camel(name)));

        self.types
            .insert(full_name, TypeRef::new(module, rust_path.join("::")));
    }

    /// Look up a fully qualified schema name such as `.example.HelloRequest`
    pub fn resolve(&self, full_name: &str) -> Result<TypeRef, SchemaError> {
        self.types
            .get(full_name)
            .cloned()
            .ok_or_else(|| SchemaError::UnresolvedType(full_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Maps schema packages to Rust module paths
#[derive(Debug, Clone)]
pub struct ModuleMapper {
    root: String,
    extern_paths: BTreeMap<String, String>,
}

impl ModuleMapper {
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.module_root.clone(),
            extern_paths: config.resolved_extern_paths(),
        }
    }

    /// Rust module for `package`
    ///
    /// The longest matching extern path wins; remaining package segments are
    /// appended as snake_case modules.
    pub fn module_for(&self, package: &str) -> String {
        let qualified = format!(".{package}");
        let matched = self
            .extern_paths
            .iter()
            .filter(|(prefix, _)| {
                qualified == **prefix || qualified.starts_with(&format!("{prefix}."))
            })
            .max_by_key(|(prefix, _)| prefix.len());

        let (base, rest) = match matched {
            Some((prefix, module)) => (module.as_str(), &qualified[prefix.len()..]),
            None => (self.root.as_str(), qualified.as_str()),
        };

        let mut module = base.to_string();
        for segment in rest.split('.').filter(|s| !s.is_empty()) {
            module.push_str("::");
            module.push_str(&escape_ident(&to_snake_case(segment)));
        }
        module
    }
}

/// Convert every file protoc asked us to generate
///
/// Each entry pairs the file name with its conversion result so one bad file
/// does not stop the others.
pub fn schema_files(
    request: &CodeGeneratorRequest,
    config: &Config,
) -> Vec<(String, Result<SchemaFile, SchemaError>)> {
    let modules = ModuleMapper::new(config);
    let index = TypeIndex::build(&request.proto_file, &modules);
    tracing::debug!(types = index.len(), "indexed schema types");

    request
        .file_to_generate
        .iter()
        .map(|name| {
            let converted = request
                .proto_file
                .iter()
                .find(|file| file.name() == name)
                .ok_or_else(|| SchemaError::UnresolvedType(name.clone()))
                .and_then(|file| convert_file(file, &index, &modules));
            (name.clone(), converted)
        })
        .collect()
}

/// Convert one descriptor into a schema file
pub fn convert_file(
    file: &FileDescriptorProto,
    index: &TypeIndex,
    modules: &ModuleMapper,
) -> Result<SchemaFile, SchemaError> {
    let name = file.name();
    let prefix = name.strip_suffix(".proto").unwrap_or(name);
    let mut schema = SchemaFile::new(
        name,
        file.package(),
        modules.module_for(file.package()),
        prefix,
    );

    for message in &file.message_type {
        schema = schema.with_message(convert_message(message, index)?);
    }

    for (position, service) in file.service.iter().enumerate() {
        let docs_path = [SERVICE_FIELD, position as i32];
        schema = schema.with_service(convert_service(
            service,
            &docs_path,
            file.source_code_info.as_ref(),
            index,
        )?);
    }
    Ok(schema)
}

fn convert_message(message: &DescriptorProto, index: &TypeIndex) -> Result<Message, SchemaError> {
    let mut converted = Message::new(message.name());
    for field in &message.field {
        converted = converted.with_field(field.name(), field_type(field, index)?);
    }
    for nested in &message.nested_type {
        converted = converted.with_nested(convert_message(nested, index)?);
    }
    Ok(converted)
}

fn field_type(field: &FieldDescriptorProto, index: &TypeIndex) -> Result<FieldType, SchemaError> {
    let scalar = match field.r#type() {
        Type::Message | Type::Group => {
            return Ok(FieldType::Message(index.resolve(field.type_name())?));
        }
        Type::Enum => return Ok(FieldType::Enum(index.resolve(field.type_name())?)),
        Type::Double => ScalarType::Double,
        Type::Float => ScalarType::Float,
        Type::Int32 => ScalarType::Int32,
        Type::Int64 => ScalarType::Int64,
        Type::Uint32 => ScalarType::Uint32,
        Type::Uint64 => ScalarType::Uint64,
        Type::Sint32 => ScalarType::Sint32,
        Type::Sint64 => ScalarType::Sint64,
        Type::Fixed32 => ScalarType::Fixed32,
        Type::Fixed64 => ScalarType::Fixed64,
        Type::Sfixed32 => ScalarType::Sfixed32,
        Type::Sfixed64 => ScalarType::Sfixed64,
        Type::Bool => ScalarType::Bool,
        Type::String => ScalarType::String,
        Type::Bytes => ScalarType::Bytes,
    };
    Ok(FieldType::Scalar(scalar))
}

fn convert_service(
    service: &ServiceDescriptorProto,
    path: &[i32],
    source: Option<&SourceCodeInfo>,
    index: &TypeIndex,
) -> Result<Service, SchemaError> {
    let mut converted = Service::new(service.name()).with_docs(leading_comments(source, path));

    for (position, method) in service.method.iter().enumerate() {
        if method.client_streaming() || method.server_streaming() {
            tracing::warn!(
                service = %service.name(),
                method = %method.name(),
                "skipping streaming method"
            );
            continue;
        }

        let mut method_path = path.to_vec();
        method_path.extend([METHOD_FIELD, position as i32]);
        converted = converted.with_method(
            Method::new(
                method.name(),
                index.resolve(method.input_type())?,
                index.resolve(method.output_type())?,
            )
            .with_docs(leading_comments(source, &method_path)),
        );
    }
    Ok(converted)
}

/// Leading comment lines attached to the element at `path`
fn leading_comments(source: Option<&SourceCodeInfo>, path: &[i32]) -> Vec<String> {
    let Some(location) = source.and_then(|info| info.location.iter().find(|l| l.path == path))
    else {
        return Vec::new();
    };

    let comments = location.leading_comments().trim_end();
    if comments.is_empty() {
        return Vec::new();
    }
    comments
        .lines()
        .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end().to_string())
        .collect()
}
