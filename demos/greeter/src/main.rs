//! Runs a Greeter server and a client on an in-process bus

use busbridge::context::Context;
use busbridge::memory::MemoryTransport;
use busbridge::service::{ServerOptions, ServiceConfig};
use greeter::Greeter;
use greeter::example::{GreeterBusClient, HelloRequest, new_greeter_bus_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bus = MemoryTransport::new();
    let conn = bus.connection();
    let ctx = Context::background();

    let server = new_greeter_bus_server(
        &ctx,
        &conn,
        Greeter::new(),
        ServiceConfig::new("demo", "1.0.0").with_description("Greeter demo"),
        ServerOptions::new().with_concurrent_jobs(4),
    )
    .await?;

    let client = GreeterBusClient::new(conn, "demo");
    for name in ["Ada", "Grace", "Linus"] {
        let reply = client
            .say_hello(&ctx, &HelloRequest { name: name.to_string() })
            .await?;
        println!("{}", reply.message);
    }

    match client.fail(&ctx, &HelloRequest::default()).await {
        Ok(reply) => println!("unexpected reply: {}", reply.message),
        Err(err) => println!("Fail returned: {err}"),
    }

    server.stop().await;
    Ok(())
}
