//! # busbridge
//!
//! Expose protobuf services on a request/reply message bus.
//!
//! `protoc-gen-busbridge` turns every service of a `.proto` file into:
//! - a `{Service}Server` trait to implement
//! - a `new_{service}_bus_server` constructor that registers one bus endpoint
//!   per method and dispatches requests on a bounded worker pool
//! - a `{Service}BusClient` that issues request/reply calls
//!
//! ## Quick Start
//!
//! Generate the adaptor next to the prost output and include it in the module
//! holding the message types:
//!
//! ```ignore
//! pub mod example {
//!     include!(concat!(env!("OUT_DIR"), "/example.rs"));
//!     include!(concat!(env!("OUT_DIR"), "/example/example-bus-adaptor.rs"));
//! }
//! ```
//!
//! ## Serving and Calling
//!
//! ```ignore
//! use busbridge::prelude::*;
//!
//! let bus = MemoryTransport::new();
//! let ctx = Context::background();
//! let server = example::new_greeter_bus_server(
//!     &ctx,
//!     &bus.connection(),
//!     MyGreeter::default(),
//!     ServiceConfig::new("greeter", "1.0.0"),
//!     ServerOptions::new().with_concurrent_jobs(4),
//! )
//! .await?;
//!
//! let client = example::GreeterBusClient::new(bus.connection(), "greeter");
//! let reply = client.say_hello(&ctx, &example::HelloRequest::default()).await?;
//!
//! server.stop().await;
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`busbridge_core`] - Subject naming and the error header contract
//! - [`busbridge_runtime`] - Transport seam, services, worker pool, client

// Re-export runtime modules under the paths generated code imports
pub use busbridge_runtime::{client, codec, context, memory, service, status, transport};

// Re-export the wire contract
pub use busbridge_core::{ERROR_CODE, ERROR_CODE_HEADER, ERROR_HEADER, subject};

// Re-export common dependencies that generated code needs
pub use async_trait;
pub use prost;
pub use tokio;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use busbridge::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use busbridge_runtime::prelude::*;

    pub use async_trait::async_trait;
}
