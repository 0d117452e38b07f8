//! The execution context asynchronous readers run under.
//!
//! Every [`AsyncReader::run`](super::AsyncReader::run) opens a child scope on
//! the same runtime and does not resolve until every task spawned in that
//! child scope has finished. A panic in such a task is raised again from the
//! run once all of its siblings are done.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use super::runtime;
use crate::effect::error::panic_message;

/// A handle to the cooperative scheduler an asynchronous reader runs in.
///
/// Every wrapped function of an [`AsyncReader`](super::AsyncReader) receives
/// the `Scope` it is being run under, so it can spawn work of its own.
/// Clones share the same set of tracked tasks.
///
/// # Examples
///
/// ```rust
/// use reader_kleisli::effect::{AsyncReader, Scope};
///
/// # #[tokio::main]
/// # async fn main() {
/// let reader: AsyncReader<i32, i32> = AsyncReader::new(|scope: Scope, environment: i32| async move {
///     scope.spawn(async move { environment * 2 }).await.unwrap()
/// });
///
/// assert_eq!(reader.run(&Scope::current(), 21).await, 42);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Scope {
    handle: Handle,
    tasks: TaskTracker,
    failure: Arc<Mutex<Option<String>>>,
}

impl Scope {
    /// Wraps an explicit runtime handle in a new root scope.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            tasks: TaskTracker::new(),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// A root scope on the runtime the caller is running in, or on the
    /// global fallback runtime outside of any runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(runtime::handle())
    }

    /// The underlying runtime handle.
    #[must_use]
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }

    /// A fresh scope on the same runtime with its own set of tracked tasks.
    pub(crate) fn child(&self) -> Self {
        Self::new(self.handle.clone())
    }

    /// Spawns `future` as a task tracked by this scope.
    ///
    /// The task runs to completion even if the returned handle is dropped.
    /// If it panics, the handle reports the panic as usual and the scope
    /// remembers it, so [`Scope::join`] panics too.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let failure = Arc::clone(&self.failure);
        self.track(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(output) => output,
                Err(payload) => {
                    failure
                        .lock()
                        .get_or_insert_with(|| panic_message(payload.as_ref()));
                    std::panic::resume_unwind(payload)
                }
            }
        })
    }

    /// Spawns `future` as a task tracked by this scope whose panic is left to
    /// the owner of the returned handle.
    pub(crate) fn track<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let task = self.tasks.spawn_on(future, &self.handle);
        #[cfg(feature = "tracing")]
        tracing::trace!(pending = self.tasks.len(), "spawned task on reader scope");
        task
    }

    /// Waits until every task spawned in this scope has finished.
    ///
    /// Tasks spawned while waiting, including by the tasks themselves, are
    /// waited for as well.
    ///
    /// # Panics
    ///
    /// Panics with the message of the first task spawned through
    /// [`Scope::spawn`] that panicked.
    pub async fn join(&self) {
        self.tasks.close();
        self.tasks.wait().await;

        let failure = self.failure.lock().take();
        if let Some(message) = failure {
            #[cfg(feature = "tracing")]
            tracing::debug!(%message, "task spawned in reader scope panicked");
            std::panic::panic_any(message);
        }
    }
}

impl From<Handle> for Scope {
    fn from(handle: Handle) -> Self {
        Self::new(handle)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::current()
    }
}
