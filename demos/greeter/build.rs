//! Generates the Greeter bus adaptor into OUT_DIR
//!
//! The schema is described directly with the codegen model; a project using
//! protoc would get the same artifact from `protoc-gen-busbridge`.

use busbridge_codegen::{
    FieldType, Generator, GeneratorOptions, Message, Method, ScalarType, SchemaFile, Service,
    TypeRef,
};
use std::path::PathBuf;

fn schema() -> SchemaFile {
    let file = SchemaFile::new(
        "example/example.proto",
        "example",
        "crate::example",
        "example/example",
    );
    let hello_request = file.local_type("HelloRequest");
    let hello_reply = file.local_type("HelloReply");
    let echo = file.local_type("EchoMessage");
    let metadata = TypeRef::new("crate::common", "Metadata");

    file.with_message(
        Message::new("HelloRequest").with_field("name", FieldType::Scalar(ScalarType::String)),
    )
    .with_message(
        Message::new("HelloReply").with_field("message", FieldType::Scalar(ScalarType::String)),
    )
    .with_message(
        Message::new("EchoMessage")
            .with_field("text", FieldType::Scalar(ScalarType::String))
            .with_field("count", FieldType::Scalar(ScalarType::Uint32)),
    )
    .with_service(
        Service::new("Greeter")
            .with_docs(["Greets callers over the message bus."])
            .with_method(
                Method::new("SayHello", hello_request.clone(), hello_reply.clone())
                    .with_docs(["Returns a greeting for the given name."]),
            )
            .with_method(
                Method::new("Echo", echo.clone(), echo)
                    .with_docs(["Returns the request unchanged."]),
            )
            .with_method(
                Method::new("Fail", hello_request, hello_reply.clone())
                    .with_docs(["Always fails."]),
            )
            .with_method(
                Method::new("SaveMetadata", metadata, hello_reply)
                    .with_docs(["Stores caller metadata."]),
            ),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let report = Generator::new(GeneratorOptions::default()).generate(&[schema()]);
    if let Some(err) = report.failures.first() {
        return Err(err.to_string().into());
    }
    report.write_all(&out_dir)?;
    Ok(())
}
