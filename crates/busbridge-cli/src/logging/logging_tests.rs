#![allow(non_snake_case)]

use super::*;

// Logging::init tests

#[test]
fn Logging___init___starts_at_requested_level() {
    let (subscriber, logging) = Logging::init(false);

    tracing::subscriber::with_default(subscriber, || {
        assert_eq!(logging.current_filter().as_deref(), Some("info"));
    });
}

// Logging::enable_debug tests

#[test]
fn Logging___enable_debug___raises_live_filter() {
    let (subscriber, logging) = Logging::init(false);

    tracing::subscriber::with_default(subscriber, || {
        logging.enable_debug().unwrap();

        assert_eq!(logging.current_filter().as_deref(), Some("debug"));
    });
}

#[test]
fn Logging___enable_debug___subscriber_dropped___fails() {
    let (subscriber, logging) = Logging::init(false);
    drop(subscriber);

    let err = logging.enable_debug().unwrap_err();

    assert!(format!("{err:#}").contains("Failed to reload log filter"));
    assert_eq!(logging.current_filter(), None);
}
