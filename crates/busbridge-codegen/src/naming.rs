//! Naming convention utilities for code generation.
//!
//! Schema names arrive in protobuf style; generated Rust follows the naming
//! prost applies to the message types it emits.
//!
//! # Supported Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `SayHello` | [`to_snake_case`] | `say_hello` |
//! | `hello_world` | [`to_upper_camel`] | `HelloWorld` |
//! | `type` | [`escape_ident`] | `r#type` |

/// Split an identifier into lowercase words.
///
/// Word boundaries are `_`, `-`, `.`, a lowercase or digit followed by an
/// uppercase letter, and the last capital of an acronym followed by a
/// lowercase letter (`HTTPServer` is `http`, `server`).
fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert an identifier to snake_case.
///
/// # Examples
///
/// ```
/// use busbridge_codegen::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("SayHello"), "say_hello");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// assert_eq!(to_snake_case("already_snake"), "already_snake");
/// ```
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// Convert an identifier to UpperCamelCase.
///
/// # Examples
///
/// ```
/// use busbridge_codegen::naming::to_upper_camel;
///
/// assert_eq!(to_upper_camel("hello_world"), "HelloWorld");
/// assert_eq!(to_upper_camel("HTTPRequest"), "HttpRequest");
/// assert_eq!(to_upper_camel("Greeter"), "Greeter");
/// ```
pub fn to_upper_camel(s: &str) -> String {
    split_words(s).iter().map(|word| capitalize(word)).collect()
}

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use busbridge_codegen::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers
const RESERVED: &[&str] = &["self", "Self", "super", "crate"];

/// Make `name` usable as a Rust identifier.
///
/// Keywords become raw identifiers; the few that cannot be raw get a
/// trailing underscore.
///
/// # Examples
///
/// ```
/// use busbridge_codegen::naming::escape_ident;
///
/// assert_eq!(escape_ident("type"), "r#type");
/// assert_eq!(escape_ident("self"), "self_");
/// assert_eq!(escape_ident("echo"), "echo");
/// ```
pub fn escape_ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Check if `s` is a valid (possibly raw) Rust identifier.
///
/// # Examples
///
/// ```
/// use busbridge_codegen::naming::is_identifier;
///
/// assert!(is_identifier("HelloRequest"));
/// assert!(is_identifier("r#type"));
/// assert!(!is_identifier("9lives"));
/// assert!(!is_identifier("_"));
/// ```
pub fn is_identifier(s: &str) -> bool {
    let body = s.strip_prefix("r#").unwrap_or(s);
    let mut chars = body.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            body != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn to_snake_case___converts_upper_camel() {
        assert_eq!(to_snake_case("SayHello"), "say_hello");
        assert_eq!(to_snake_case("SaveMetadata"), "save_metadata");
        assert_eq!(to_snake_case("Echo"), "echo");
    }

    #[test]
    fn to_snake_case___handles_acronyms() {
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("GetURL"), "get_url");
    }

    #[test]
    fn to_snake_case___keeps_digits_with_word() {
        assert_eq!(to_snake_case("GetV2"), "get_v2");
        assert_eq!(to_snake_case("Foo2Bar"), "foo2_bar");
    }

    #[test]
    fn to_snake_case___normalizes_separators() {
        assert_eq!(to_snake_case("foo.bar-baz"), "foo_bar_baz");
        assert_eq!(to_snake_case("foo__bar"), "foo_bar");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn to_upper_camel___converts_snake_case() {
        assert_eq!(to_upper_camel("hello_world"), "HelloWorld");
        assert_eq!(to_upper_camel("hello_request"), "HelloRequest");
    }

    #[test]
    fn to_upper_camel___normalizes_acronyms() {
        assert_eq!(to_upper_camel("HTTPRequest"), "HttpRequest");
        assert_eq!(to_upper_camel("URL"), "Url");
    }

    #[test]
    fn to_upper_camel___keeps_upper_camel() {
        assert_eq!(to_upper_camel("Greeter"), "Greeter");
        assert_eq!(to_upper_camel("EchoRequest"), "EchoRequest");
    }

    #[test]
    fn capitalize___preserves_rest_of_string() {
        assert_eq!(capitalize("helloWorld"), "HelloWorld");
        assert_eq!(capitalize("a"), "A");
    }

    #[test]
    fn escape_ident___keywords_become_raw() {
        assert_eq!(escape_ident("type"), "r#type");
        assert_eq!(escape_ident("async"), "r#async");
        assert_eq!(escape_ident("gen"), "r#gen");
    }

    #[test]
    fn escape_ident___reserved_get_suffix() {
        assert_eq!(escape_ident("self"), "self_");
        assert_eq!(escape_ident("crate"), "crate_");
    }

    #[test]
    fn is_identifier___rejects_malformed() {
        assert!(!is_identifier(""));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier("dash-ed"));
        assert!(!is_identifier("r#"));
    }

    #[test]
    fn is_identifier___accepts_underscored() {
        assert!(is_identifier("_private"));
        assert!(is_identifier("snake_case_2"));
    }
}
