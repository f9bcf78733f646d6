// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dp_adapters::{BrowserCall, FakeBrowserAdapter};
use std::time::Duration;

fn queue(max: usize) -> (ExecutionQueue<FakeBrowserAdapter>, FakeBrowserAdapter) {
    let browser = FakeBrowserAdapter::new();
    (ExecutionQueue::new(browser.clone(), SessionOptions::default(), max), browser)
}

#[tokio::test]
async fn submitted_task_returns_its_value() {
    let (queue, _) = queue(2);
    let handle = queue.submit(|| async { 40 + 2 });
    assert_eq!(handle.join().await.unwrap(), 42);
}

#[tokio::test(start_paused = true)]
async fn running_tasks_never_exceed_the_limit() {
    let (queue, _) = queue(3);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            queue.submit(move || async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();
    for handle in handles {
        handle.join().await.unwrap();
    }

    assert_eq!(peak.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn tasks_start_in_submission_order() {
    let (queue, _) = queue(1);
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let order = Arc::clone(&order);
            queue.submit(move || async move {
                tokio::task::yield_now().await;
                order.lock().push(i);
            })
        })
        .collect();
    for handle in handles {
        handle.join().await.unwrap();
    }

    assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn panicking_task_is_contained() {
    let (queue, _) = queue(1);
    let bad = queue.submit(|| async { panic!("selector exploded") });
    let good = queue.submit(|| async { "still running" });

    match bad.join().await {
        Err(QueueError::Panicked(msg)) => assert_eq!(msg, "selector exploded"),
        other => panic!("expected a contained panic, got {:?}", other.map(|_| ())),
    }
    assert_eq!(good.join().await.unwrap(), "still running");
}

#[tokio::test]
async fn shutdown_drops_tasks_that_have_not_started() {
    let (queue, browser) = queue(1);
    let (started_tx, started_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    let first = queue.submit(move || async move {
        let _ = started_tx.send(());
        let _ = release_rx.await;
        "first"
    });
    let second = queue.submit(|| async { "second" });
    started_rx.await.unwrap();

    queue.shutdown().await;
    assert!(matches!(second.join().await, Err(QueueError::Closed)));

    let _ = release_tx.send(());
    assert_eq!(first.join().await.unwrap(), "first");

    let late = queue.submit(|| async { "late" });
    assert!(matches!(late.join().await, Err(QueueError::Closed)));
    assert!(!browser.is_running());
}

#[tokio::test]
async fn session_is_created_once_per_user() {
    let (queue, browser) = queue(2);
    let alice = UserId::from("alice");
    let bob = UserId::from("bob");

    let a1 = queue.acquire_session(&alice).await.unwrap();
    let a2 = queue.acquire_session(&alice).await.unwrap();
    let b = queue.acquire_session(&bob).await.unwrap();

    assert!(Arc::ptr_eq(&a1, &a2));
    assert_ne!(a1.id(), b.id());
    assert_eq!(browser.starts(), 1);
    assert_eq!(browser.sessions_created(), 2);
    assert_eq!(queue.session_users().await, vec![alice, bob]);
}

#[tokio::test]
async fn release_closes_and_forgets_the_session() {
    let (queue, browser) = queue(1);
    let user = UserId::from("alice");
    let first = queue.acquire_session(&user).await.unwrap();

    queue.release_session(&user).await;
    assert_eq!(browser.open_sessions(), 0);
    assert!(queue.session_users().await.is_empty());

    let second = queue.acquire_session(&user).await.unwrap();
    assert_ne!(first.id(), second.id());
}

#[tokio::test]
async fn release_swallows_close_errors() {
    let browser = FakeBrowserAdapter::new().fail_close();
    let queue = ExecutionQueue::new(browser.clone(), SessionOptions::default(), 1);
    let user = UserId::from("alice");
    queue.acquire_session(&user).await.unwrap();

    queue.release_session(&user).await;

    assert!(queue.session_users().await.is_empty());
    assert_eq!(browser.open_sessions(), 0);
}

#[tokio::test]
async fn dead_browser_is_restarted_and_stale_sessions_dropped() {
    let (queue, browser) = queue(1);
    let user = UserId::from("alice");
    let before = queue.acquire_session(&user).await.unwrap();

    browser.crash();
    let after = queue.acquire_session(&user).await.unwrap();

    assert_eq!(browser.starts(), 2);
    assert_ne!(before.id(), after.id());
}

#[tokio::test]
async fn launch_failure_surfaces_as_browser_error() {
    let browser = FakeBrowserAdapter::new().fail_start();
    let queue = ExecutionQueue::new(browser, SessionOptions::default(), 1);

    let err = queue.acquire_session(&UserId::from("alice")).await.err().unwrap();
    assert!(matches!(err, QueueError::Browser(BrowserError::LaunchFailed(_))));
}

#[tokio::test]
async fn shutdown_is_idempotent() {
    let (queue, browser) = queue(1);
    queue.acquire_session(&UserId::from("alice")).await.unwrap();

    queue.shutdown().await;
    queue.shutdown().await;

    let stops = browser.calls().iter().filter(|c| **c == BrowserCall::Stop).count();
    assert_eq!(stops, 1);
    assert_eq!(browser.open_sessions(), 0);
    assert!(matches!(
        queue.acquire_session(&UserId::from("alice")).await,
        Err(QueueError::Closed)
    ));
}
