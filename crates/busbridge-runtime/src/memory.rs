//! In-process transport
//!
//! Routes requests between servers and clients living in the same process.
//! Every live subscriber of a subject is treated as one queue group: each
//! request is delivered to exactly one of them, chosen round-robin.

use crate::transport::{
    Connection, Headers, Message, Request, Responder, Subscription, Transport, TransportError,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{mpsc, oneshot};

/// Requests buffered per subscription before the transport applies backpressure
const SUBSCRIPTION_BUFFER: usize = 64;

/// In-memory message bus
#[derive(Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    subjects: DashMap<String, Vec<mpsc::Sender<Request>>>,
    cursor: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryTransport {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection handle for generated servers and clients
    pub fn connection(&self) -> Connection {
        Arc::new(self.clone())
    }

    /// Close the bus; subscriptions end and further operations fail
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.subjects.clear();
    }

    /// Check if the bus was closed
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions on a subject
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.inner
            .subjects
            .get(subject)
            .map(|subscribers| subscribers.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    fn pick_subscriber(&self, subject: &str) -> Option<mpsc::Sender<Request>> {
        let mut subscribers = self.inner.subjects.get_mut(subject)?;
        subscribers.retain(|sender| !sender.is_closed());
        if subscribers.is_empty() {
            return None;
        }
        let index = self.inner.cursor.fetch_add(1, Ordering::Relaxed) % subscribers.len();
        Some(subscribers[index].clone())
    }
}

/// Delivers the reply back to the waiting requester
struct OneshotResponder {
    sender: Option<oneshot::Sender<Message>>,
}

#[async_trait]
impl Responder for OneshotResponder {
    async fn send(&mut self, reply: Message) -> Result<(), TransportError> {
        let sender = self
            .sender
            .take()
            .ok_or(TransportError::AlreadyResponded)?;
        sender
            .send(reply)
            .map_err(|_| TransportError::Other("requester is no longer waiting".to_string()))
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn subscribe(
        &self,
        subject: &str,
        _queue_group: Option<&str>,
    ) -> Result<Subscription, TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }

        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        self.inner
            .subjects
            .entry(subject.to_string())
            .or_default()
            .push(sender);

        tracing::debug!(subject = %subject, "subscribed");
        Ok(Subscription::new(subject, receiver))
    }

    async fn request(
        &self,
        subject: &str,
        headers: Headers,
        payload: Vec<u8>,
    ) -> Result<Message, TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }

        let subscriber = self
            .pick_subscriber(subject)
            .ok_or_else(|| TransportError::NoResponders(subject.to_string()))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        let responder = OneshotResponder {
            sender: Some(reply_tx),
        };
        let request = Request::new(subject, headers, payload, Box::new(responder));

        subscriber
            .send(request)
            .await
            .map_err(|_| TransportError::NoResponders(subject.to_string()))?;

        reply_rx
            .await
            .map_err(|_| TransportError::Other(format!("request on {subject} dropped without a reply")))
    }
}

#[cfg(test)]
#[path = "memory/memory_tests.rs"]
mod memory_tests;
