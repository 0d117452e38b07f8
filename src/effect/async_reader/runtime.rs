//! Runtime plumbing behind [`Scope`](super::Scope).
//!
//! Asynchronous readers never create a runtime on their own. When a caller
//! asks for the "current" scope outside of any tokio runtime, the handle of a
//! lazily built, process-wide multi-thread runtime is used instead.
//!
//! - [`global`]: the shared fallback runtime
//! - [`handle`]: the current runtime's handle, or the global one
//! - [`try_run_blocking`]: drive a future to completion from synchronous code
//!
//! # Examples
//!
//! ```rust
//! use reader_kleisli::effect::runtime::try_run_blocking;
//!
//! assert_eq!(try_run_blocking(async { 40 + 2 }), Ok(42));
//! ```

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::LazyLock;

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

/// Fallback runtime with one worker per CPU core. Never dropped.
static GLOBAL_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("reader-kleisli-worker")
        .enable_all()
        .build()
        .expect("Failed to create global tokio runtime")
});

/// Returns the process-wide fallback runtime, building it on first use.
#[inline]
#[must_use]
pub fn global() -> &'static Runtime {
    &GLOBAL_RUNTIME
}

/// Returns the handle of the runtime the caller is running in, falling back
/// to [`global`] outside of any runtime.
#[inline]
#[must_use]
pub fn handle() -> Handle {
    Handle::try_current().unwrap_or_else(|_| global().handle().clone())
}

/// Reasons a future cannot be driven to completion from synchronous code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingError {
    /// `block_in_place` is unavailable in a current-thread runtime.
    CurrentThreadRuntime,

    /// The surrounding runtime has a flavor this crate does not know how to
    /// block on.
    UnsupportedRuntimeFlavor,
}

impl fmt::Display for BlockingError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentThreadRuntime => write!(
                formatter,
                "cannot block inside a current-thread runtime: \
                 block_in_place requires a multi-thread runtime"
            ),
            Self::UnsupportedRuntimeFlavor => write!(
                formatter,
                "cannot block inside a runtime of unsupported flavor"
            ),
        }
    }
}

impl Error for BlockingError {}

/// Drives `future` to completion, blocking the current thread.
///
/// - Inside a multi-thread runtime the current handle is used through
///   `block_in_place`.
/// - Outside any runtime the [`global`] runtime is used.
///
/// # Errors
///
/// Returns [`BlockingError::CurrentThreadRuntime`] when called from a
/// current-thread runtime, and [`BlockingError::UnsupportedRuntimeFlavor`]
/// for any other flavor tokio may add. The future is not polled in either
/// case.
pub fn try_run_blocking<F, T>(future: F) -> Result<T, BlockingError>
where
    F: Future<Output = T>,
{
    let Ok(current) = Handle::try_current() else {
        #[cfg(feature = "tracing")]
        tracing::trace!("blocking on the global runtime");
        return Ok(global().block_on(future));
    };

    match current.runtime_flavor() {
        RuntimeFlavor::MultiThread => {
            #[cfg(feature = "tracing")]
            tracing::trace!("blocking in place on the current multi-thread runtime");
            Ok(tokio::task::block_in_place(|| current.block_on(future)))
        }
        RuntimeFlavor::CurrentThread => {
            #[cfg(feature = "tracing")]
            tracing::debug!("refusing to block inside a current-thread runtime");
            Err(BlockingError::CurrentThreadRuntime)
        }
        _ => Err(BlockingError::UnsupportedRuntimeFlavor),
    }
}
