//! Out-of-band error metadata

/// Header carrying the human-readable failure reason.
///
/// Matches the NATS micro protocol so adaptors interoperate with other
/// micro-service clients on the same bus.
pub const ERROR_HEADER: &str = "Nats-Service-Error";

/// Header carrying the failure code.
pub const ERROR_CODE_HEADER: &str = "Nats-Service-Error-Code";

/// Code reported for every handler failure.
pub const ERROR_CODE: &str = "500";
