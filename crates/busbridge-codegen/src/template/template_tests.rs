#![allow(non_snake_case)]

use super::*;
use tempfile::TempDir;
use test_case::test_case;

// Template::parse tests

#[test]
fn Template___parse___collects_placeholders_in_order() {
    let template = Template::parse("t", "fn {{name}}() -> {{ ty }} { {{name}} }").unwrap();

    let names: Vec<_> = template.placeholders().collect();

    assert_eq!(names, vec!["name", "ty", "name"]);
}

#[test]
fn Template___parse___plain_text_has_no_placeholders() {
    let template = Template::parse("t", "struct Plain { field: u8 }").unwrap();

    assert_eq!(template.placeholders().count(), 0);
}

#[test]
fn Template___parse___unterminated___reports_line() {
    let err = Template::parse("service", "line one\nline two\n{{broken\n").unwrap_err();

    match err {
        SynthesisError::Parse {
            template,
            line,
            reason,
        } => {
            assert_eq!(template, "service");
            assert_eq!(line, 3);
            assert_eq!(reason, "unterminated placeholder");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test_case("{{}}" ; "empty")]
#[test_case("{{Name}}" ; "uppercase")]
#[test_case("{{has space}}" ; "inner space")]
#[test_case("{{a-b}}" ; "dash")]
fn Template___parse___malformed___returns_parse_error(source: &str) {
    let err = Template::parse("t", source).unwrap_err();

    assert!(matches!(err, SynthesisError::Parse { line: 1, .. }));
}

// Template::render tests

#[test]
fn Template___render___substitutes_bindings() {
    let template = Template::parse("t", "pub struct {{service}}BusClient;").unwrap();

    let out = template
        .render(&Bindings::new().with("service", "Greeter"))
        .unwrap();

    assert_eq!(out, "pub struct GreeterBusClient;");
}

#[test]
fn Template___render___ignores_extra_bindings() {
    let template = Template::parse("t", "{{a}}").unwrap();

    let out = template
        .render(&Bindings::new().with("a", "1").with("b", "2"))
        .unwrap();

    assert_eq!(out, "1");
}

#[test]
fn Template___render___missing_binding___returns_unbound() {
    let template = Template::parse("handler", "{{method}}").unwrap();

    let err = template.render(&Bindings::new()).unwrap_err();

    assert!(matches!(
        err,
        SynthesisError::Unbound { ref template, ref placeholder }
            if template == "handler" && placeholder == "method"
    ));
}

#[test]
fn Template___render___values_are_not_reparsed() {
    let template = Template::parse("t", "{{a}}").unwrap();

    let out = template
        .render(&Bindings::new().with("a", "{{b}}"))
        .unwrap();

    assert_eq!(out, "{{b}}");
}

// TemplateSet tests

#[test]
fn TemplateSet___embedded___all_templates_parse() {
    let set = TemplateSet::embedded();

    assert!(set.parse().is_ok());
    for kind in TemplateKind::ALL {
        assert!(!set.source(kind).is_empty(), "{kind} is empty");
    }
}

#[test]
fn TemplateSet___from_dir___overrides_present_files_only() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("file.tmpl"), "// custom {{source}}\n").unwrap();

    let set = TemplateSet::from_dir(dir.path()).unwrap();

    assert_eq!(set.source(TemplateKind::File), "// custom {{source}}\n");
    assert_eq!(
        set.source(TemplateKind::Handler),
        TemplateSet::embedded().source(TemplateKind::Handler)
    );
}

#[test]
fn TemplateSet___from_dir___missing_dir_uses_embedded() {
    let dir = TempDir::new().unwrap();

    let set = TemplateSet::from_dir(&dir.path().join("absent")).unwrap();

    assert_eq!(set, TemplateSet::embedded());
}

#[test]
fn TemplateSet___parse___broken_override_fails() {
    let set = TemplateSet::embedded().with_source(TemplateKind::Endpoint, "{{oops");

    let err = set.parse().unwrap_err();

    assert!(matches!(err, SynthesisError::Parse { ref template, .. } if template == "endpoint"));
}

#[test]
fn TemplateKind___file_name___uses_tmpl_extension() {
    assert_eq!(TemplateKind::ServerMethod.file_name(), "server_method.tmpl");
}
