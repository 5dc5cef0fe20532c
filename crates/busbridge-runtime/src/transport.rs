//! Transport seam between generated adaptors and a message bus
//!
//! Generated code only ever talks to a [`Connection`]: subscribe to a subject
//! (optionally in a queue group) and issue request/reply calls. A NATS client
//! plugs in by implementing [`Transport`]; [`crate::memory::MemoryTransport`]
//! is the in-process implementation.

use crate::context::{Context, ContextError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Message headers (transport side-channel metadata)
pub type Headers = BTreeMap<String, String>;

/// Shared connection handle used by generated servers and clients
pub type Connection = Arc<dyn Transport>;

/// Errors raised by the transport or during service registration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid service config: {0}")]
    InvalidConfig(String),

    #[error("no responders available for request on {0}")]
    NoResponders(String),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("request already responded to")]
    AlreadyResponded,

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("transport error: {0}")]
    Other(String),
}

impl From<ContextError> for TransportError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => TransportError::Cancelled,
            ContextError::DeadlineExceeded => TransportError::DeadlineExceeded,
        }
    }
}

/// A reply (or any message) travelling over the bus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub headers: Headers,
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a message without headers
    pub fn new(subject: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            subject: subject.into(),
            headers: Headers::new(),
            payload,
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Look up a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Sends the reply for one inbound request
#[async_trait]
pub trait Responder: Send {
    async fn send(&mut self, reply: Message) -> Result<(), TransportError>;
}

/// Inbound request handle delivered to an endpoint
pub struct Request {
    subject: String,
    headers: Headers,
    payload: Vec<u8>,
    responder: Option<Box<dyn Responder>>,
}

impl Request {
    /// Create a request; transports call this when a message arrives
    pub fn new(
        subject: impl Into<String>,
        headers: Headers,
        payload: Vec<u8>,
        responder: Box<dyn Responder>,
    ) -> Self {
        Self {
            subject: subject.into(),
            headers,
            payload,
            responder: Some(responder),
        }
    }

    /// Subject the request arrived on
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Request headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Request payload
    pub fn data(&self) -> &[u8] {
        &self.payload
    }

    /// Whether a reply (success or error) has already been attempted
    pub fn has_responded(&self) -> bool {
        self.responder.is_none()
    }

    /// Reply with a payload
    pub async fn respond(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.respond_with_headers(Headers::new(), payload).await
    }

    /// Reply with a payload and headers
    ///
    /// A request can be answered once; later attempts fail with
    /// [`TransportError::AlreadyResponded`].
    pub async fn respond_with_headers(
        &mut self,
        headers: Headers,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        let mut responder = self
            .responder
            .take()
            .ok_or(TransportError::AlreadyResponded)?;
        let reply = Message {
            subject: self.subject.clone(),
            headers,
            payload,
        };
        responder.send(reply).await
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("subject", &self.subject)
            .field("headers", &self.headers)
            .field("payload_len", &self.payload.len())
            .field("responded", &self.has_responded())
            .finish()
    }
}

/// Stream of inbound requests for one subject
#[derive(Debug)]
pub struct Subscription {
    subject: String,
    receiver: mpsc::Receiver<Request>,
}

impl Subscription {
    /// Wrap a receiver fed by the transport
    pub fn new(subject: impl Into<String>, receiver: mpsc::Receiver<Request>) -> Self {
        Self {
            subject: subject.into(),
            receiver,
        }
    }

    /// Subject this subscription listens on
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Wait for the next request; `None` once the subscription is closed
    pub async fn next(&mut self) -> Option<Request> {
        self.receiver.recv().await
    }

    /// Stop accepting new requests
    ///
    /// Requests already buffered can still be drained with [`Self::next`].
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// Message bus operations used by generated code
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Subscribe to `subject`; subscribers sharing a queue group split the load
    async fn subscribe(
        &self,
        subject: &str,
        queue_group: Option<&str>,
    ) -> Result<Subscription, TransportError>;

    /// Send a request and wait for its reply
    async fn request(
        &self,
        subject: &str,
        headers: Headers,
        payload: Vec<u8>,
    ) -> Result<Message, TransportError>;
}

/// Issue a request bound to the caller's cancellation and deadline
pub async fn request_with_context(
    conn: &dyn Transport,
    ctx: &Context,
    subject: &str,
    headers: Headers,
    payload: Vec<u8>,
) -> Result<Message, TransportError> {
    ctx.run(conn.request(subject, headers, payload)).await?
}
