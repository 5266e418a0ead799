//! Contract: failure handling never advances loop state
//!
//! Verifies the error excursions of the loop:
//! - A resolve failure triggers no publish and leaves state untouched
//! - A publish failure leaves state untouched, so the next cycle retries
//!   the very same address
//! - Neither failure kind terminates the loop

mod common;

use common::*;
use ddns6_core::{EngineEvent, PublishOutcome, UpdateLoop};

#[tokio::test]
async fn resolve_failure_skips_publish_and_recovers() {
    // Two failed discoveries, then a stable address.
    let source = ScriptedAddressSource::with_script(
        vec![Err(resolve_error()), Err(resolve_error())],
        addr("2001:db8::1"),
    );

    let publisher = ScriptedPublisher::always_updated();
    let publish_calls = publisher.calls();
    let published = publisher.published();

    let (engine, _events) =
        UpdateLoop::new(Box::new(source), Box::new(publisher), fast_config())
            .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let engine_handle = tokio::spawn(async move {
        engine.run_with_shutdown(Some(shutdown_rx)).await
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();

    // The loop survived both failures and published once after recovery.
    assert_eq!(publish_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(published.lock().unwrap().clone(), vec![addr("2001:db8::1")]);
}

#[tokio::test]
async fn publish_failure_retries_the_same_address() {
    let source = ScriptedAddressSource::constant(addr("2001:db8::1"));

    // First attempt fails; the retry succeeds.
    let publisher = ScriptedPublisher::with_script(vec![
        Err(publish_error()),
        Ok(PublishOutcome::Updated),
    ]);
    let publish_calls = publisher.calls();
    let published = publisher.published();

    let (engine, mut events) =
        UpdateLoop::new(Box::new(source), Box::new(publisher), fast_config())
            .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let engine_handle = tokio::spawn(async move {
        engine.run_with_shutdown(Some(shutdown_rx)).await
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();

    // The failed attempt must not have been recorded as confirmed: the
    // next cycle retried the very same address, and only then stopped.
    assert_eq!(
        published.lock().unwrap().clone(),
        vec![addr("2001:db8::1"), addr("2001:db8::1")],
        "failed publish must be retried with the same address"
    );
    assert_eq!(publish_calls.load(std::sync::atomic::Ordering::SeqCst), 2);

    // Event order tells the same story: a failure, then a confirmation.
    let mut saw_failure_then_publish = false;
    let mut failed = false;
    while let Ok(event) = events.try_recv() {
        match event {
            EngineEvent::PublishFailed { .. } => failed = true,
            EngineEvent::Published { .. } if failed => saw_failure_then_publish = true,
            _ => {}
        }
    }
    assert!(
        saw_failure_then_publish,
        "expected PublishFailed followed by Published"
    );
}
