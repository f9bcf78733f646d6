// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded FIFO execution queue with per-user browser sessions.
//!
//! Tasks are admitted in submission order by a single dispatcher that holds
//! one semaphore permit per running task. A panicking task is contained and
//! reported through its [`TaskHandle`]; it never poisons the queue.
//!
//! The queue also owns the shared browser. Each user gets one isolated
//! session, created on first use and discarded after the run. When the
//! browser process is found dead, every cached session is dropped and the
//! browser is started again before a new session is handed out.

use dp_adapters::{BrowserAdapter, BrowserError, BrowserSession, SessionOptions};
use dp_core::UserId;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex, Semaphore};

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("execution queue is shut down")]
    Closed,
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

type QueuedTask = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Completion of a submitted task.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T, QueueError>>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task. Tasks dropped by [`ExecutionQueue::shutdown`]
    /// before they started resolve to [`QueueError::Closed`].
    pub async fn join(self) -> Result<T, QueueError> {
        self.rx.await.unwrap_or(Err(QueueError::Closed))
    }
}

struct QueueInner<B: BrowserAdapter> {
    browser: B,
    options: SessionOptions,
    sessions: Mutex<HashMap<UserId, Arc<B::Session>>>,
    permits: Arc<Semaphore>,
    admit: mpsc::UnboundedSender<QueuedTask>,
    active: Arc<AtomicUsize>,
    shut_down: AtomicBool,
}

/// Bounded worker pool sharing one browser.
pub struct ExecutionQueue<B: BrowserAdapter> {
    inner: Arc<QueueInner<B>>,
}

impl<B: BrowserAdapter> Clone for ExecutionQueue<B> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<B: BrowserAdapter> ExecutionQueue<B> {
    /// Create the queue and spawn its dispatcher. Must be called inside a
    /// tokio runtime.
    pub fn new(browser: B, options: SessionOptions, max_concurrency: usize) -> Self {
        let permits = Arc::new(Semaphore::new(max_concurrency.max(1)));
        let active = Arc::new(AtomicUsize::new(0));
        let (admit, rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch(rx, Arc::clone(&permits), Arc::clone(&active)));
        Self {
            inner: Arc::new(QueueInner {
                browser,
                options,
                sessions: Mutex::new(HashMap::new()),
                permits,
                admit,
                active,
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Enqueue a task. It starts once every earlier task has started and a
    /// slot is free.
    pub fn submit<F, Fut, T>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        if self.is_shut_down() {
            let _ = tx.send(Err(QueueError::Closed));
            return TaskHandle { rx };
        }
        let queued: QueuedTask = Box::new(move || {
            async move {
                let result = AssertUnwindSafe(async move { task().await })
                    .catch_unwind()
                    .await
                    .map_err(|payload| QueueError::Panicked(panic_message(payload.as_ref())));
                if let Err(QueueError::Panicked(msg)) = &result {
                    tracing::error!(panic = %msg, "queued task panicked");
                }
                let _ = tx.send(result);
            }
            .boxed()
        });
        // A closed dispatcher drops the task, which resolves the handle as closed
        let _ = self.inner.admit.send(queued);
        TaskHandle { rx }
    }

    /// Tasks currently holding a slot.
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }

    /// The user's session, starting the browser or creating the session as
    /// needed.
    pub async fn acquire_session(&self, user: &UserId) -> Result<Arc<B::Session>, QueueError> {
        if self.is_shut_down() {
            return Err(QueueError::Closed);
        }
        let mut sessions = self.inner.sessions.lock().await;
        if !self.inner.browser.is_alive().await {
            if !sessions.is_empty() {
                tracing::warn!(stale = sessions.len(), "browser not running, dropping sessions");
                sessions.clear();
            }
            self.inner.browser.start().await?;
            tracing::info!("browser started");
        }
        if let Some(session) = sessions.get(user) {
            return Ok(Arc::clone(session));
        }
        let session = Arc::new(self.inner.browser.new_session(&self.inner.options).await?);
        sessions.insert(user.clone(), Arc::clone(&session));
        tracing::debug!(user_id = %user, "browser session created");
        Ok(session)
    }

    /// Close and forget the user's session. Close errors are logged only.
    pub async fn release_session(&self, user: &UserId) {
        let session = self.inner.sessions.lock().await.remove(user);
        if let Some(session) = session {
            if let Err(e) = session.close().await {
                tracing::warn!(user_id = %user, error = %e, "failed to close browser session");
            }
        }
    }

    /// Users that currently hold a session.
    pub async fn session_users(&self) -> Vec<UserId> {
        let mut users: Vec<_> = self.inner.sessions.lock().await.keys().cloned().collect();
        users.sort();
        users
    }

    /// Stop admitting tasks, close every session and stop the browser.
    /// Tasks already running finish on their own. Safe to call twice.
    pub async fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.permits.close();
        let sessions: Vec<_> = self.inner.sessions.lock().await.drain().collect();
        for (user, session) in sessions {
            if let Err(e) = session.close().await {
                tracing::warn!(user_id = %user, error = %e, "failed to close browser session");
            }
        }
        if let Err(e) = self.inner.browser.stop().await {
            tracing::warn!(error = %e, "failed to stop browser");
        }
        tracing::info!("execution queue shut down");
    }
}

async fn dispatch(
    mut rx: mpsc::UnboundedReceiver<QueuedTask>,
    permits: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
) {
    while let Some(task) = rx.recv().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            tracing::debug!("queue closed, dropping pending tasks");
            break;
        };
        let active = Arc::clone(&active);
        active.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            task().await;
            active.fetch_sub(1, Ordering::SeqCst);
            drop(permit);
        });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
