//! greeter - Example service served over busbridge
//!
//! `example` holds the message types and the generated adaptor;
//! [`Greeter`] is the hand-written server implementation.

use busbridge::async_trait::async_trait;
use busbridge::context::Context;
use busbridge::status::BoxError;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod common {
    /// Caller supplied key/value pair
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Metadata {
        #[prost(string, tag = "1")]
        pub key: String,
        #[prost(string, tag = "2")]
        pub value: String,
    }
}

pub mod example {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct HelloRequest {
        #[prost(string, tag = "1")]
        pub name: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct HelloReply {
        #[prost(string, tag = "1")]
        pub message: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct EchoMessage {
        #[prost(string, tag = "1")]
        pub text: String,
        #[prost(uint32, tag = "2")]
        pub count: u32,
    }

    include!(concat!(env!("OUT_DIR"), "/example/example-bus-adaptor.rs"));
}

use common::Metadata;
use example::{EchoMessage, GreeterServer, HelloReply, HelloRequest};

/// Reason returned by [`GreeterServer::fail`]
pub const FAIL_REASON: &str = "boom";

/// Greeter implementation that remembers saved metadata
#[derive(Debug, Clone, Default)]
pub struct Greeter {
    saved: Arc<Mutex<Vec<Metadata>>>,
}

impl Greeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata stored by `SaveMetadata` calls so far
    pub async fn saved(&self) -> Vec<Metadata> {
        self.saved.lock().await.clone()
    }
}

#[async_trait]
impl GreeterServer for Greeter {
    async fn say_hello(
        &self,
        _ctx: Context,
        request: HelloRequest,
    ) -> Result<HelloReply, BoxError> {
        tracing::debug!(name = %request.name, "greeting");
        Ok(HelloReply {
            message: format!("Hello, {}!", request.name),
        })
    }

    async fn echo(&self, _ctx: Context, request: EchoMessage) -> Result<EchoMessage, BoxError> {
        Ok(request)
    }

    async fn fail(&self, _ctx: Context, _request: HelloRequest) -> Result<HelloReply, BoxError> {
        Err(FAIL_REASON.into())
    }

    async fn save_metadata(
        &self,
        _ctx: Context,
        request: Metadata,
    ) -> Result<HelloReply, BoxError> {
        let message = format!("saved {}", request.key);
        self.saved.lock().await.push(request);
        Ok(HelloReply { message })
    }
}
