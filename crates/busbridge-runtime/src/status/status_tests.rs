#![allow(non_snake_case)]

use super::*;
use crate::transport::Responder;
use async_trait::async_trait;
use std::sync::Arc;
use parking_lot::Mutex;
use test_case::test_case;

#[derive(Clone, Default)]
struct CapturingResponder {
    replies: Arc<Mutex<Vec<Message>>>,
    fail: bool,
}

#[async_trait]
impl Responder for CapturingResponder {
    async fn send(&mut self, reply: Message) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::ConnectionClosed);
        }
        self.replies.lock().push(reply);
        Ok(())
    }
}

fn request_with(responder: CapturingResponder) -> Request {
    Request::new(
        "svc.greeter.fail",
        Headers::new(),
        Vec::new(),
        Box::new(responder),
    )
}

// signal_error tests

#[tokio::test]
async fn signal_error___invoke___sends_reason_verbatim() {
    let responder = CapturingResponder::default();
    let mut request = request_with(responder.clone());

    signal_error(&mut request, &HandlerError::Invoke("boom".into())).await;

    let replies = responder.replies.lock();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].payload.is_empty());
    assert_eq!(replies[0].header(ERROR_HEADER), Some("boom"));
    assert_eq!(replies[0].header(ERROR_CODE_HEADER), Some("500"));
}

#[tokio::test]
async fn signal_error___empty_message___sends_fallback_reason() {
    let responder = CapturingResponder::default();
    let mut request = request_with(responder.clone());

    signal_error(&mut request, &HandlerError::Invoke(String::new())).await;

    let replies = responder.replies.lock();
    assert_eq!(replies[0].header(ERROR_HEADER), Some(UNSPECIFIED_REASON));
    assert_eq!(service_error(&replies[0]).unwrap().reason, UNSPECIFIED_REASON);
}

#[tokio::test]
async fn signal_error___send_fails___does_not_panic() {
    let responder = CapturingResponder {
        fail: true,
        ..Default::default()
    };
    let mut request = request_with(responder.clone());

    signal_error(&mut request, &HandlerError::PoolClosed).await;

    assert!(responder.replies.lock().is_empty());
    assert!(request.has_responded());
}

#[tokio::test]
async fn signal_error___already_responded___is_dropped() {
    let responder = CapturingResponder::default();
    let mut request = request_with(responder.clone());
    request.respond(b"ok".to_vec()).await.unwrap();

    signal_error(&mut request, &HandlerError::Invoke("late".into())).await;

    assert_eq!(responder.replies.lock().len(), 1);
}

// HandlerError tests

#[test_case(HandlerError::Invoke("boom".into()), "boom" ; "invoke is verbatim")]
#[test_case(HandlerError::Decode(CodecError::Decode("bad".into())), "decoding request: decode error: bad" ; "decode")]
#[test_case(HandlerError::Encode(CodecError::Encode("big".into())), "encoding response: encode error: big" ; "encode")]
#[test_case(HandlerError::Reply(TransportError::ConnectionClosed), "sending response: connection closed" ; "reply")]
#[test_case(HandlerError::PoolClosed, "worker pool closed" ; "pool closed")]
fn HandlerError___display___matches_stage(err: HandlerError, expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[test]
fn HandlerError___invoke___keeps_user_message() {
    let err = HandlerError::invoke("database unavailable".into());

    assert_eq!(err.to_string(), "database unavailable");
}

// service_error tests

#[test]
fn service_error___error_headers___returns_reason_and_code() {
    let mut reply = Message::new("svc.a.b", Vec::new());
    reply.headers = error_headers("boom");

    let err = service_error(&reply).unwrap();

    assert_eq!(err.reason, "boom");
    assert_eq!(err.code, "500");
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn service_error___no_headers___returns_none() {
    let reply = Message::new("svc.a.b", b"payload".to_vec());

    assert!(service_error(&reply).is_none());
}

#[test]
fn service_error___missing_code___defaults_to_reserved_code() {
    let reply = Message::new("svc.a.b", Vec::new()).with_header(ERROR_HEADER, "nope");

    let err = service_error(&reply).unwrap();

    assert_eq!(err.code, ERROR_CODE);
}

#[test]
fn service_error___empty_reason___still_a_failure() {
    let reply = Message::new("svc.a.b", Vec::new()).with_header(ERROR_HEADER, "");

    let err = service_error(&reply).unwrap();

    assert_eq!(err.reason, UNSPECIFIED_REASON);
}

#[test]
fn service_error___code_header_alone___is_a_failure() {
    let reply = Message::new("svc.a.b", Vec::new()).with_header(ERROR_CODE_HEADER, "503");

    let err = service_error(&reply).unwrap();

    assert_eq!(err.code, "503");
    assert_eq!(err.reason, UNSPECIFIED_REASON);
}
