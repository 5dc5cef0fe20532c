//! Out-of-band error signaling
//!
//! A failed request is answered with an empty payload and two headers:
//! [`ERROR_HEADER`] carries the reason and [`ERROR_CODE_HEADER`] the reserved
//! [`ERROR_CODE`]. Clients check for the headers before decoding anything.

use crate::codec::CodecError;
use crate::transport::{Headers, Message, Request, TransportError};
use busbridge_core::{ERROR_CODE, ERROR_CODE_HEADER, ERROR_HEADER};
use thiserror::Error;

/// Reason sent when a failure carries no message of its own
pub const UNSPECIFIED_REASON: &str = "unspecified service error";

/// Error type returned by service implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure inside a generated endpoint handler
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("decoding request: {0}")]
    Decode(CodecError),

    /// The service implementation failed; the message is forwarded verbatim
    #[error("{0}")]
    Invoke(String),

    #[error("encoding response: {0}")]
    Encode(CodecError),

    #[error("sending response: {0}")]
    Reply(TransportError),

    #[error("worker pool closed")]
    PoolClosed,
}

impl HandlerError {
    /// Wrap an error returned by a service implementation
    pub fn invoke(err: BoxError) -> Self {
        HandlerError::Invoke(err.to_string())
    }
}

/// Failure reported by a remote service through the error headers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ServiceError {
    pub code: String,
    pub reason: String,
}

/// Headers marking a reply as failed
pub fn error_headers(reason: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert(ERROR_HEADER.to_string(), reason.to_string());
    headers.insert(ERROR_CODE_HEADER.to_string(), ERROR_CODE.to_string());
    headers
}

/// Answer `request` with an error signal
///
/// If the signal itself cannot be sent the failure is logged and dropped.
pub async fn signal_error(request: &mut Request, err: &HandlerError) {
    let mut reason = err.to_string();
    if reason.is_empty() {
        reason = UNSPECIFIED_REASON.to_string();
    }
    if let Err(send_err) = request
        .respond_with_headers(error_headers(&reason), Vec::new())
        .await
    {
        tracing::error!(
            subject = %request.subject(),
            reason = %reason,
            send_reason = %send_err,
            "error sending response error"
        );
    }
}

/// Extract the remote failure from a reply, if it carries one
///
/// Either header marks the reply as failed, even with an empty value.
pub fn service_error(reply: &Message) -> Option<ServiceError> {
    let reason = reply.header(ERROR_HEADER);
    let code = reply.header(ERROR_CODE_HEADER);
    if reason.is_none() && code.is_none() {
        return None;
    }
    Some(ServiceError {
        code: code.filter(|c| !c.is_empty()).unwrap_or(ERROR_CODE).to_string(),
        reason: reason
            .filter(|r| !r.is_empty())
            .unwrap_or(UNSPECIFIED_REASON)
            .to_string(),
    })
}

#[cfg(test)]
#[path = "status/status_tests.rs"]
mod status_tests;
