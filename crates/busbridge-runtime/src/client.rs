//! Request/reply client used by generated `*BusClient` types

use crate::codec::{self, CodecError};
use crate::context::Context;
use crate::status::{self, ServiceError};
use crate::transport::{Connection, Headers, TransportError, request_with_context};
use busbridge_core::subject;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned from a client call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The remote handler failed; displays the remote reason verbatim
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Issues calls against one service instance
#[derive(Clone)]
pub struct Client {
    conn: Connection,
    instance: String,
    parent_span: tracing::Span,
}

impl Client {
    /// Create a client for the service instance registered as `instance`
    pub fn new(conn: Connection, instance: impl Into<String>) -> Self {
        Self {
            conn,
            instance: instance.into(),
            parent_span: tracing::Span::none(),
        }
    }

    /// Parent every call span on `span`
    pub fn with_parent_span(mut self, span: tracing::Span) -> Self {
        self.parent_span = span;
        self
    }

    /// Span call spans are parented on
    pub fn parent_span(&self) -> &tracing::Span {
        &self.parent_span
    }

    /// Instance name used as the subject prefix
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Subject a method of `service` is served on
    pub fn subject(&self, service: &str, method: &str) -> String {
        subject(service, method, Some(self.instance.as_str()))
    }

    /// Encode `request`, send it on `subject`, and decode the reply
    ///
    /// A reply carrying the error headers becomes [`ClientError::Service`]
    /// and its payload is not decoded.
    pub async fn call<In, Out>(
        &self,
        ctx: &Context,
        subject: &str,
        request: &In,
    ) -> Result<Out, ClientError>
    where
        In: prost::Message,
        Out: prost::Message + Default,
    {
        let payload = codec::encode(request)?;
        let reply =
            request_with_context(self.conn.as_ref(), ctx, subject, Headers::new(), payload).await?;

        if let Some(err) = status::service_error(&reply) {
            tracing::debug!(subject = %subject, reason = %err, "service returned an error");
            return Err(ClientError::Service(err));
        }

        Ok(codec::decode(reply.payload())?)
    }

    /// The underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("instance", &self.instance)
            .field("connections", &Arc::strong_count(&self.conn))
            .finish()
    }
}
