#![allow(non_snake_case)]

use super::*;

#[test]
fn SchemaError___display___names_offending_reference() {
    assert_eq!(
        SchemaError::EmptyTypeName {
            module: "crate::example".into()
        }
        .to_string(),
        "empty type name referenced from module `crate::example`"
    );
    assert_eq!(
        SchemaError::InvalidModulePath("crate::9bad".into()).to_string(),
        "invalid module path `crate::9bad`"
    );
    assert_eq!(
        SchemaError::UnresolvedType(".pkg.Missing".into()).to_string(),
        "unresolved type `.pkg.Missing`"
    );
}

#[test]
fn SynthesisError___parse___includes_location() {
    let err = SynthesisError::Parse {
        template: "service".into(),
        line: 12,
        reason: "unterminated placeholder".into(),
    };

    assert_eq!(
        err.to_string(),
        "template `service` line 12: unterminated placeholder"
    );
}

#[test]
fn GenerateError___display___prefixes_file() {
    let err = GenerateError::new(
        "example/example.proto",
        SynthesisError::Unbound {
            template: "handler".into(),
            placeholder: "method".into(),
        },
    );

    assert_eq!(
        err.to_string(),
        "example/example.proto: template `handler` has no binding for placeholder `method`"
    );
}

#[test]
fn GenerateError___from_schema_error___keeps_kind() {
    let err = GenerateError::new("a.proto", SchemaError::InvalidTypeName("1x".into()));

    assert!(matches!(err.kind, GenerateErrorKind::Schema(_)));
}
