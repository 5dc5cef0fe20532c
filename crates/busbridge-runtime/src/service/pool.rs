//! Bounded worker pool behind generated servers
//!
//! A [`WorkerPool`] owns `capacity` executor tasks that share one bounded
//! queue. At most `capacity` jobs are admitted at any time, counting both
//! queued and executing jobs, so a full pool pushes back on the delivery
//! task that calls [`WorkerPool::submit`].

use crate::context::Context;
use crate::status::{self, HandlerError};
use crate::transport::Request;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

/// Jobs admitted by a pool nobody configured
pub const DEFAULT_CONCURRENT_JOBS: usize = 1;

/// Per-endpoint request logic
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Process one request; the handler owns replying (or signaling an error)
    async fn handle(&self, ctx: Context, request: Request);
}

/// One unit of work: the request, the logic to run, and the submitting context
pub struct Job {
    pub ctx: Context,
    pub handler: Arc<dyn Handler>,
    pub request: Request,
}

impl Job {
    /// Create a new job
    pub fn new(ctx: Context, handler: Arc<dyn Handler>, request: Request) -> Self {
        Self {
            ctx,
            handler,
            request,
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("ctx", &self.ctx)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// Errors returned when submitting work
#[derive(Error, Debug)]
pub enum PoolError {
    /// The pool was shut down; the rejected job is handed back
    #[error("worker pool closed")]
    Closed(Job),
}

impl PoolError {
    /// Recover the job that could not be submitted
    pub fn into_job(self) -> Job {
        match self {
            PoolError::Closed(job) => job,
        }
    }
}

/// Admission slot held from submission until the job finishes
struct Slot {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Slot {
    fn new(permit: OwnedSemaphorePermit, in_flight: &Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            _permit: permit,
            in_flight: Arc::clone(in_flight),
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A job holding its admission slot until it finishes
struct Admitted {
    job: Job,
    slot: Slot,
}

/// Fixed set of executors draining a bounded job queue
pub struct WorkerPool {
    sender: async_channel::Sender<Admitted>,
    admission: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    capacity: usize,
    closed: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Start `capacity` executors on the current tokio runtime
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            tracing::warn!(
                requested = capacity,
                using = DEFAULT_CONCURRENT_JOBS,
                "worker pool needs at least one executor"
            );
            DEFAULT_CONCURRENT_JOBS
        } else {
            capacity
        };

        let (sender, receiver) = async_channel::bounded(capacity);
        let workers = (0..capacity)
            .map(|index| tokio::spawn(run_executor(index, receiver.clone())))
            .collect();

        tracing::debug!(workers = capacity, "worker pool started");

        Self {
            sender,
            admission: Arc::new(Semaphore::new(capacity)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            capacity,
            closed: AtomicBool::new(false),
            workers: Mutex::new(workers),
        }
    }

    /// Number of executors, which is also the admission limit
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs currently queued or executing
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Check if the pool stopped accepting jobs
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Enqueue a job, waiting while the pool is full
    pub async fn submit(&self, job: Job) -> Result<(), PoolError> {
        if self.is_closed() {
            return Err(PoolError::Closed(job));
        }
        let permit = match Arc::clone(&self.admission).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return Err(PoolError::Closed(job)),
        };
        let slot = Slot::new(permit, &self.in_flight);
        self.sender
            .send(Admitted { job, slot })
            .await
            .map_err(|err| PoolError::Closed(err.into_inner().job))
    }

    /// Wrap `handler` so each request it receives runs on this pool
    pub fn bind(self: &Arc<Self>, handler: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(PooledHandler {
            pool: Arc::clone(self),
            handler,
        })
    }

    /// Stop accepting jobs; already queued jobs still run
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.admission.close();
        self.sender.close();
    }

    /// Close the pool and wait for every executor to drain and exit
    pub async fn shutdown(&self) {
        self.close();
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(err) = worker.await {
                tracing::error!(reason = %err, "worker pool executor failed");
            }
        }
        tracing::debug!(workers = self.capacity, "worker pool stopped");
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.capacity)
            .field("in_flight", &self.in_flight())
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn run_executor(index: usize, jobs: async_channel::Receiver<Admitted>) {
    while let Ok(Admitted { job, slot }) = jobs.recv().await {
        let Job {
            ctx,
            handler,
            request,
        } = job;
        let subject = request.subject().to_string();

        // Run in a separate task so a panicking handler cannot take the executor down
        let outcome = tokio::spawn(async move { handler.handle(ctx, request).await }).await;
        if let Err(err) = outcome {
            tracing::error!(worker = index, subject = %subject, reason = %err, "job panicked");
        }
        drop(slot);
    }
    tracing::trace!(worker = index, "executor exiting");
}

/// Hands each request to the pool instead of running it inline
struct PooledHandler {
    pool: Arc<WorkerPool>,
    handler: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for PooledHandler {
    async fn handle(&self, ctx: Context, request: Request) {
        let job = Job::new(ctx, Arc::clone(&self.handler), request);
        if let Err(err) = self.pool.submit(job).await {
            let mut job = err.into_job();
            tracing::warn!(subject = %job.request.subject(), "rejecting request, worker pool closed");
            status::signal_error(&mut job.request, &HandlerError::PoolClosed).await;
        }
    }
}
