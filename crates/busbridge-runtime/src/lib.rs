//! busbridge-runtime - What generated bus adaptors link against
//!
//! This crate provides:
//! - [`context::Context`] for cancellation and deadlines
//! - [`transport::Transport`], the seam a message bus client plugs into, and
//!   [`memory::MemoryTransport`] for in-process use
//! - [`service::Service`] registration and the [`service::WorkerPool`] that
//!   generated servers dispatch requests on
//! - [`status`], the out-of-band error signaling convention
//! - [`client::Client`] for request/reply calls
//! - [`codec`] for payload encoding

pub mod client;
pub mod codec;
pub mod context;
pub mod memory;
pub mod service;
pub mod status;
pub mod transport;

pub use client::{Client, ClientError};
pub use context::{CancelHandle, Context, ContextError};
pub use memory::MemoryTransport;
pub use service::{ConcurrentService, ServerOptions, ServiceConfig};
pub use transport::{Connection, Transport, TransportError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Client, ClientError, ConcurrentService, Connection, Context, MemoryTransport,
        ServerOptions, ServiceConfig, Transport,
    };
}
