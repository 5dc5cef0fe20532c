//! Subject naming for service endpoints

/// Segment that separates the instance name from the service path.
pub const SUBJECT_SERVICE_SEGMENT: &str = "svc";

/// Build the bus subject for a service method.
///
/// The subject is `{instance}.svc.{service}.{method}`, lowercased. When no
/// instance is given (or it is empty) the prefix is dropped and the subject is
/// `svc.{service}.{method}`.
///
/// Server registration and client dispatch both call this function, so the
/// same inputs always produce the same subject on both sides.
///
/// # Examples
///
/// ```
/// use busbridge_core::subject;
///
/// assert_eq!(subject("Greeter", "SayHello", Some("Demo")), "demo.svc.greeter.sayhello");
/// assert_eq!(subject("Greeter", "SayHello", None), "svc.greeter.sayhello");
/// ```
pub fn subject(service: &str, method: &str, instance: Option<&str>) -> String {
    let raw = match instance.filter(|name| !name.is_empty()) {
        Some(instance) => format!("{instance}.{SUBJECT_SERVICE_SEGMENT}.{service}.{method}"),
        None => format!("{SUBJECT_SERVICE_SEGMENT}.{service}.{method}"),
    };
    raw.to_lowercase()
}
