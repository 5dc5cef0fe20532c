#![allow(non_snake_case)]

use super::*;

async fn serve_echo(mut subscription: Subscription) {
    while let Some(mut request) = subscription.next().await {
        let payload = request.data().to_vec();
        request.respond(payload).await.unwrap();
    }
}

#[tokio::test]
async fn MemoryTransport___request___routes_to_subscriber() {
    let bus = MemoryTransport::new();
    let subscription = bus.subscribe("svc.echo.echo", None).await.unwrap();
    tokio::spawn(serve_echo(subscription));

    let reply = bus
        .request("svc.echo.echo", Headers::new(), b"ping".to_vec())
        .await
        .unwrap();

    assert_eq!(reply.payload(), b"ping");
    assert_eq!(reply.subject, "svc.echo.echo");
}

#[tokio::test]
async fn MemoryTransport___request___no_subscriber___returns_no_responders() {
    let bus = MemoryTransport::new();

    let err = bus
        .request("svc.nobody.home", Headers::new(), Vec::new())
        .await
        .unwrap_err();

    assert_eq!(err, TransportError::NoResponders("svc.nobody.home".into()));
}

#[tokio::test]
async fn MemoryTransport___request___dropped_subscription___returns_no_responders() {
    let bus = MemoryTransport::new();
    let subscription = bus.subscribe("svc.gone.away", None).await.unwrap();
    drop(subscription);

    let err = bus
        .request("svc.gone.away", Headers::new(), Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::NoResponders(_)));
    assert_eq!(bus.subscriber_count("svc.gone.away"), 0);
}

#[tokio::test]
async fn MemoryTransport___request___handler_drops_request___returns_error() {
    let bus = MemoryTransport::new();
    let mut subscription = bus.subscribe("svc.silent.drop", None).await.unwrap();
    tokio::spawn(async move {
        while let Some(request) = subscription.next().await {
            drop(request);
        }
    });

    let err = bus
        .request("svc.silent.drop", Headers::new(), Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Other(_)));
}

#[tokio::test]
async fn MemoryTransport___request___headers_reach_reply() {
    let bus = MemoryTransport::new();
    let mut subscription = bus.subscribe("svc.headers.echo", None).await.unwrap();
    tokio::spawn(async move {
        while let Some(mut request) = subscription.next().await {
            let headers = request.headers().clone();
            request
                .respond_with_headers(headers, Vec::new())
                .await
                .unwrap();
        }
    });
    let mut headers = Headers::new();
    headers.insert("X-Trace".into(), "abc".into());

    let reply = bus
        .request("svc.headers.echo", headers, Vec::new())
        .await
        .unwrap();

    assert_eq!(reply.header("X-Trace"), Some("abc"));
}

#[tokio::test]
async fn MemoryTransport___subscribe___round_robins_between_subscribers() {
    let bus = MemoryTransport::new();
    let mut first = bus.subscribe("svc.pool.work", Some("workers")).await.unwrap();
    let mut second = bus.subscribe("svc.pool.work", Some("workers")).await.unwrap();
    tokio::spawn(async move {
        while let Some(mut request) = first.next().await {
            request.respond(b"first".to_vec()).await.unwrap();
        }
    });
    tokio::spawn(async move {
        while let Some(mut request) = second.next().await {
            request.respond(b"second".to_vec()).await.unwrap();
        }
    });

    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..4 {
        let reply = bus
            .request("svc.pool.work", Headers::new(), Vec::new())
            .await
            .unwrap();
        seen.insert(reply.payload);
    }

    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn MemoryTransport___close___rejects_operations() {
    let bus = MemoryTransport::new();

    bus.close();

    assert!(bus.is_closed());
    assert_eq!(
        bus.subscribe("svc.a.b", None).await.unwrap_err(),
        TransportError::ConnectionClosed
    );
    assert_eq!(
        bus.request("svc.a.b", Headers::new(), Vec::new())
            .await
            .unwrap_err(),
        TransportError::ConnectionClosed
    );
}

#[tokio::test]
async fn MemoryTransport___close___ends_subscriptions() {
    let bus = MemoryTransport::new();
    let mut subscription = bus.subscribe("svc.a.b", None).await.unwrap();

    bus.close();

    assert!(subscription.next().await.is_none());
}

#[tokio::test]
async fn Request___respond_twice___returns_already_responded() {
    let bus = MemoryTransport::new();
    let mut subscription = bus.subscribe("svc.twice.reply", None).await.unwrap();
    let server = tokio::spawn(async move {
        let mut request = subscription.next().await.unwrap();
        request.respond(b"once".to_vec()).await.unwrap();
        request.respond(b"twice".to_vec()).await
    });

    let reply = bus
        .request("svc.twice.reply", Headers::new(), Vec::new())
        .await
        .unwrap();

    assert_eq!(reply.payload(), b"once");
    assert_eq!(
        server.await.unwrap(),
        Err(TransportError::AlreadyResponded)
    );
}
