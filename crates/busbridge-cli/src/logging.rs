//! stderr logging whose level can be raised after the request is read
//!
//! protoc passes plugin parameters inside the request, so `debug=true`
//! arrives after the subscriber is installed. The filter sits behind a
//! reload layer for that reason.

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Handle controlling the level of the installed subscriber
pub struct Logging {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl Logging {
    /// Build the stderr subscriber and the handle controlling its filter
    pub fn init(debug: bool) -> (impl Subscriber + Send + Sync + 'static, Self) {
        let (filter, handle) = reload::Layer::new(env_filter(debug));
        let subscriber = tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        );
        (subscriber, Self { handle })
    }

    /// Switch to debug logging; `RUST_LOG` still wins when set
    pub fn enable_debug(&self) -> Result<()> {
        self.handle
            .reload(env_filter(true))
            .context("Failed to reload log filter")?;
        tracing::debug!("debug logging enabled");
        Ok(())
    }

    /// The active filter directives, if the subscriber is still alive
    pub fn current_filter(&self) -> Option<String> {
        self.handle.with_current(ToString::to_string).ok()
    }
}

fn env_filter(debug: bool) -> EnvFilter {
    let default = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

#[cfg(test)]
#[path = "logging/logging_tests.rs"]
mod logging_tests;
