#![allow(non_snake_case)]

use super::*;
use crate::schema::{FieldType, Message, ScalarType, TypeRef};

fn greeter_file() -> SchemaFile {
    let file = SchemaFile::new(
        "example/example.proto",
        "example",
        "crate::example",
        "example/example",
    );
    let request = file.local_type("HelloRequest");
    let reply = file.local_type("HelloReply");
    let metadata = TypeRef::new("crate::common", "Metadata");
    file.with_message(
        Message::new("HelloRequest").with_field("name", FieldType::Scalar(ScalarType::String)),
    )
    .with_message(
        Message::new("HelloReply").with_field("message", FieldType::Scalar(ScalarType::String)),
    )
    .with_service(
        Service::new("Greeter")
            .with_docs(["Greets people."])
            .with_method(
                Method::new("SayHello", request.clone(), reply.clone())
                    .with_docs(["Sends a greeting."]),
            )
            .with_method(Method::new("SaveMetadata", metadata, reply)),
    )
}

fn synthesize(file: &SchemaFile) -> Option<GeneratedFile> {
    let imports = ImportSet::resolve(file).unwrap();
    CodeSynthesizer::default()
        .synthesize(file, &imports, &GeneratorOptions::default())
        .unwrap()
}

#[test]
fn CodeSynthesizer___synthesize___no_services___returns_none() {
    let file = SchemaFile::new("m.proto", "m", "crate::m", "m").with_message(Message::new("Only"));

    assert!(synthesize(&file).is_none());
}

#[test]
fn CodeSynthesizer___synthesize___names_artifact_from_prefix() {
    let generated = synthesize(&greeter_file()).unwrap();

    assert_eq!(generated.name, "example/example-bus-adaptor.rs");
}

#[test]
fn CodeSynthesizer___synthesize___emits_server_trait() {
    let content = synthesize(&greeter_file()).unwrap().content;

    assert!(content.contains("pub trait GreeterServer: Send + Sync + 'static {"));
    assert!(content.contains("    async fn say_hello(\n"));
    assert!(content.contains("request: HelloRequest,"));
    assert!(content.contains("Result<HelloReply, status::BoxError>"));
    assert!(content.contains("    /// Sends a greeting.\n"));
    assert!(content.contains("/// Greets people.\n"));
}

#[test]
fn CodeSynthesizer___synthesize___emits_constructor_and_endpoints() {
    let content = synthesize(&greeter_file()).unwrap().content;

    assert!(content.contains("pub async fn new_greeter_bus_server<S: GreeterServer>("));
    assert!(content.contains(
        "service::subject(\"Greeter\", \"SayHello\", Some(config.name.as_str()))"
    ));
    assert!(content.contains(
        "service::subject(\"Greeter\", \"SaveMetadata\", Some(config.name.as_str()))"
    ));
    assert!(content.contains(".with_description(\"Sends a greeting.\")"));
    assert!(content.contains("/// Served on `{instance}.svc.greeter.sayhello`."));
}

#[test]
fn CodeSynthesizer___synthesize___handlers_log_each_stage() {
    let content = synthesize(&greeter_file()).unwrap().content;

    assert!(content.contains("struct GreeterSayHelloHandler<S> {"));
    assert!(content.contains("impl<S: GreeterServer> service::Handler for GreeterSayHelloHandler<S>"));
    for stage in [
        "\"decoding request\"",
        "\"service error\"",
        "\"encoding response\"",
        "\"sending response\"",
    ] {
        assert_eq!(content.matches(stage).count(), 2, "stage {stage}");
    }
}

#[test]
fn CodeSynthesizer___synthesize___qualifies_foreign_types() {
    let content = synthesize(&greeter_file()).unwrap().content;

    assert!(content.contains("use crate::common;\n"));
    assert!(content.contains("request: common::Metadata,"));
    assert!(content.contains("request: &common::Metadata,"));
}

#[test]
fn CodeSynthesizer___synthesize___emits_client() {
    let content = synthesize(&greeter_file()).unwrap().content;

    assert!(content.contains("pub struct GreeterBusClient {"));
    assert!(content.contains("    pub async fn save_metadata(\n"));
    assert!(content.contains("Result<HelloReply, client::ClientError>"));
    assert!(content.contains("self.inner.subject(\"Greeter\", \"SaveMetadata\")"));
}

#[test]
fn CodeSynthesizer___synthesize___header_names_source() {
    let content = synthesize(&greeter_file()).unwrap().content;

    assert!(content.starts_with("// Code generated by busbridge-codegen "));
    assert!(content.contains("// source: example/example.proto\n"));
}

#[test]
fn CodeSynthesizer___synthesize___keyword_method_is_escaped() {
    let file = SchemaFile::new("k.proto", "k", "crate::k", "k");
    let ty = file.local_type("Msg");
    let file = file.with_service(Service::new("Jobs").with_method(Method::new("Move", ty.clone(), ty)));

    let content = synthesize(&file).unwrap().content;

    assert!(content.contains("async fn r#move("));
    assert!(content.contains("\"move\", subject = %"));
}

#[test]
fn CodeSynthesizer___synthesize___client_method_names_are_not_shadowed() {
    let file = SchemaFile::new("c.proto", "c", "crate::c", "c");
    let ty = file.local_type("Msg");
    let file = file.with_service(
        Service::new("Svc")
            .with_method(Method::new("New", ty.clone(), ty.clone()))
            .with_method(Method::new("WithParentSpan", ty.clone(), ty)),
    );

    let content = synthesize(&file).unwrap().content;

    assert_eq!(content.matches("pub fn new(").count(), 1);
    assert_eq!(content.matches("pub fn with_parent_span(").count(), 1);
    assert!(content.contains("pub async fn new_("));
    assert!(content.contains("pub async fn with_parent_span_("));
    assert!(content.contains("    async fn new_(\n"));
    assert!(content.contains("self.server.new_("));
    assert!(content.contains("self.inner.subject(\"Svc\", \"New\")"));
}

#[test]
fn CodeSynthesizer___synthesize___deterministic() {
    let file = greeter_file();

    assert_eq!(synthesize(&file), synthesize(&file));
}

#[test]
fn CodeSynthesizer___synthesize___unbound_placeholder_fails() {
    let templates = TemplateSet::embedded().with_source(TemplateKind::Handler, "{{not_bound}}");
    let file = greeter_file();
    let imports = ImportSet::resolve(&file).unwrap();

    let err = CodeSynthesizer::new(templates)
        .synthesize(&file, &imports, &GeneratorOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        SynthesisError::Unbound { ref placeholder, .. } if placeholder == "not_bound"
    ));
}

#[test]
fn doc_lines___blank_lines_keep_marker() {
    let docs = vec!["First.".to_string(), String::new(), "Second.  ".to_string()];

    assert_eq!(doc_lines(&docs, "  "), "  /// First.\n  ///\n  /// Second.\n");
}
