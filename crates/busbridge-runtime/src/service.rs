//! Service registration on the bus
//!
//! A [`Service`] groups endpoints under one name and version. Each endpoint
//! gets its own delivery task that pulls requests off the transport
//! subscription and hands them to a [`Handler`]. Generated servers pair a
//! service with a [`WorkerPool`] in a [`ConcurrentService`].

pub mod pool;

use crate::context::{CancelHandle, Context};
use crate::transport::{Connection, Subscription, TransportError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub use busbridge_core::subject;
pub use pool::{DEFAULT_CONCURRENT_JOBS, Handler, Job, PoolError, WorkerPool};

/// Caller-supplied description of a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name; also the instance prefix of every endpoint subject
    pub name: String,

    /// Service version
    pub version: String,

    /// Queue group shared by all instances of the service
    pub queue_group: Option<String>,

    /// Human-readable description
    pub description: Option<String>,

    /// Free-form metadata
    pub metadata: BTreeMap<String, String>,
}

impl ServiceConfig {
    /// Create a new service configuration
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Set the queue group
    pub fn with_queue_group(mut self, queue_group: impl Into<String>) -> Self {
        self.queue_group = Some(queue_group.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.name.is_empty() {
            return Err(TransportError::InvalidConfig(
                "service name must not be empty".to_string(),
            ));
        }
        if let Some(c) = self
            .name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(TransportError::InvalidConfig(format!(
                "service name {:?} contains invalid character {c:?}",
                self.name
            )));
        }
        if self.version.is_empty() {
            return Err(TransportError::InvalidConfig(
                "service version must not be empty".to_string(),
            ));
        }
        if self.queue_group.as_deref() == Some("") {
            return Err(TransportError::InvalidConfig(
                "queue group must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options for generated servers
#[derive(Debug, Clone)]
pub struct ServerOptions {
    concurrent_jobs: usize,
    parent_span: tracing::Span,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            concurrent_jobs: DEFAULT_CONCURRENT_JOBS,
            parent_span: tracing::Span::none(),
        }
    }
}

impl ServerOptions {
    /// Create options with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool size
    pub fn with_concurrent_jobs(mut self, jobs: usize) -> Self {
        self.concurrent_jobs = jobs;
        self
    }

    /// Parent every handler span on `span`
    pub fn with_parent_span(mut self, span: tracing::Span) -> Self {
        self.parent_span = span;
        self
    }

    /// Configured worker pool size
    pub fn concurrent_jobs(&self) -> usize {
        self.concurrent_jobs
    }

    /// Span handler spans are parented on
    pub fn parent_span(&self) -> &tracing::Span {
        &self.parent_span
    }
}

/// Endpoint registration parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    pub name: String,
    pub subject: String,
    pub metadata: BTreeMap<String, String>,
}

impl EndpointConfig {
    /// Create a new endpoint configuration
    pub fn new(name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a description; empty descriptions are skipped
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.is_empty() {
            self.metadata.insert("description".to_string(), description);
        }
        self
    }
}

/// Registered endpoint as reported by [`Service::info`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointInfo {
    pub name: String,
    pub subject: String,
    pub queue_group: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Snapshot of a service and its endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub queue_group: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub endpoints: Vec<EndpointInfo>,
}

/// A named group of endpoints on a connection
pub struct Service {
    conn: Connection,
    info: Mutex<ServiceInfo>,
    stop: CancelHandle,
    stop_ctx: Context,
    loops: Mutex<Vec<JoinHandle<()>>>,
}

impl Service {
    /// Register a service descriptor
    pub fn add(conn: &Connection, config: &ServiceConfig) -> Result<Service, TransportError> {
        config.validate()?;

        let (stop_ctx, stop) = Context::background().with_cancel();
        let info = ServiceInfo {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: config.name.clone(),
            version: config.version.clone(),
            description: config.description.clone(),
            queue_group: config.queue_group.clone(),
            metadata: config.metadata.clone(),
            endpoints: Vec::new(),
        };

        tracing::debug!(
            service = %info.name,
            version = %info.version,
            id = %info.id,
            "service registered"
        );

        Ok(Service {
            conn: Arc::clone(conn),
            info: Mutex::new(info),
            stop,
            stop_ctx,
            loops: Mutex::new(Vec::new()),
        })
    }

    /// Subscribe an endpoint and start delivering its requests to `handler`
    ///
    /// Every request is handed to the handler together with `ctx`.
    pub async fn add_endpoint(
        &self,
        ctx: &Context,
        endpoint: EndpointConfig,
        handler: Arc<dyn Handler>,
    ) -> Result<(), TransportError> {
        if self.stopped() {
            return Err(TransportError::ConnectionClosed);
        }
        if endpoint.name.is_empty() || endpoint.subject.is_empty() {
            return Err(TransportError::InvalidConfig(
                "endpoint name and subject must not be empty".to_string(),
            ));
        }

        let queue_group = self.info.lock().queue_group.clone();
        let subscription = self
            .conn
            .subscribe(&endpoint.subject, queue_group.as_deref())
            .await?;

        {
            let mut info = self.info.lock();
            tracing::info!(
                service = %info.name,
                version = %info.version,
                queue_group = ?info.queue_group,
                endpoint = %endpoint.name,
                subject = %endpoint.subject,
                "registered endpoint"
            );
            info.endpoints.push(EndpointInfo {
                name: endpoint.name,
                subject: endpoint.subject,
                queue_group,
                metadata: endpoint.metadata,
            });
        }

        let delivery = tokio::spawn(deliver(
            subscription,
            ctx.clone(),
            self.stop_ctx.clone(),
            handler,
        ));
        self.loops.lock().push(delivery);
        Ok(())
    }

    /// Snapshot of the service and its endpoints
    pub fn info(&self) -> ServiceInfo {
        self.info.lock().clone()
    }

    /// Stop every endpoint and wait for their delivery tasks to finish
    ///
    /// Requests already buffered on a subscription are still handed to the
    /// handler. Idempotent.
    pub async fn stop(&self) {
        self.stop.cancel();
        let loops = std::mem::take(&mut *self.loops.lock());
        for delivery in loops {
            if let Err(err) = delivery.await {
                tracing::error!(reason = %err, "endpoint delivery task failed");
            }
        }
    }

    /// Check if [`Self::stop`] was called
    pub fn stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

async fn deliver(
    mut subscription: Subscription,
    ctx: Context,
    stop: Context,
    handler: Arc<dyn Handler>,
) {
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            next = subscription.next() => match next {
                Some(request) => handler.handle(ctx.clone(), request).await,
                None => return,
            },
        }
    }

    subscription.close();
    while let Some(request) = subscription.next().await {
        handler.handle(ctx.clone(), request).await;
    }
    tracing::debug!(subject = %subscription.subject(), "endpoint stopped");
}

/// A service whose endpoints run on a shared [`WorkerPool`]
pub struct ConcurrentService {
    service: Service,
    pool: Arc<WorkerPool>,
}

impl ConcurrentService {
    /// Pair a registered service with the pool its endpoints submit to
    pub fn new(service: Service, pool: Arc<WorkerPool>) -> Self {
        {
            let info = service.info.lock();
            tracing::info!(
                service = %info.name,
                version = %info.version,
                queue_group = ?info.queue_group,
                workers = pool.capacity(),
                "service started"
            );
        }
        Self { service, pool }
    }

    /// Snapshot of the service and its endpoints
    pub fn info(&self) -> ServiceInfo {
        self.service.info()
    }

    /// Worker pool size
    pub fn workers(&self) -> usize {
        self.pool.capacity()
    }

    /// The pool endpoints submit to
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Stop endpoint delivery, then drain and stop the worker pool
    pub async fn stop(&self) {
        self.service.stop().await;
        self.pool.shutdown().await;
        tracing::info!(service = %self.service.info.lock().name, "service stopped");
    }

    /// Check if [`Self::stop`] was called
    pub fn stopped(&self) -> bool {
        self.service.stopped()
    }
}
