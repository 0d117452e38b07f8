//! Asynchronous Reader Monad.
//!
//! `AsyncReader<R, A>` is the suspendable counterpart of
//! [`Reader`](super::Reader): it wraps a function that, given a [`Scope`] and
//! an environment `R`, returns a future of `A`. The wrapped functions only run
//! while the future returned by [`AsyncReader::run`] is driven by the
//! caller's runtime, and they may suspend at any point.
//!
//! # Scopes
//!
//! Each run opens a child [`Scope`] of the scope it was given. Every wrapped
//! function of a composite reader receives that child scope, and the run
//! resolves only after all tasks spawned in it have finished. Multiplication
//! runs the outer and the inner reader as two nested runs.
//!
//! # Evaluation Order
//!
//! Composite readers evaluate their parts strictly left to right and await
//! each part before starting the next, exactly the order the synchronous
//! [`Reader`](super::Reader) uses:
//!
//! - `fmap`: the reader, then the function
//! - `multiply` / `flat_map`: the outer reader, then the inner reader it
//!   produced, both on the same environment
//! - `apply`: the function reader, then the value reader. `apply` is
//!   defined through `flat_map`, so the two sides are never evaluated
//!   concurrently.
//!
//! # Laws
//!
//! The Functor and Monad laws of [`Reader`](super::Reader) hold, with
//! equality meaning "runs to the same value for every scope and environment".
//!
//! # Examples
//!
//! ```rust
//! use reader_kleisli::effect::{AsyncReader, Scope};
//!
//! #[derive(Clone)]
//! struct Config {
//!     base_url: String,
//!     retries: u32,
//! }
//!
//! fn describe() -> AsyncReader<Config, String> {
//!     AsyncReader::asks(|config: Config| config.base_url)
//!         .map2(AsyncReader::asks(|config: Config| config.retries), |url, retries| {
//!             format!("{url} (retries: {retries})")
//!         })
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = Config { base_url: "https://example.com".to_string(), retries: 3 };
//! let described = describe().run(&Scope::current(), config).await;
//! assert_eq!(described, "https://example.com (retries: 3)");
//! # }
//! ```

#![forbid(unsafe_code)]

mod kleisli;
pub mod runtime;
mod scope;

pub use kleisli::AsyncKleisliReader;
pub use scope::Scope;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use self::runtime::BlockingError;
use super::SpawnError;

type RunFunction<R, A> = dyn Fn(Scope, R) -> BoxFuture<'static, A> + Send + Sync;

/// A suspendable computation that produces an `A` from an environment `R`.
///
/// Cloning is cheap and clones share the wrapped function. Nothing is cached
/// between runs.
///
/// # Examples
///
/// ```rust
/// use reader_kleisli::effect::{AsyncReader, Scope};
///
/// # #[tokio::main]
/// # async fn main() {
/// let reader: AsyncReader<i32, i32> = AsyncReader::<i32, i32>::ask().flat_map(|environment| AsyncReader::pure(environment * 2));
/// assert_eq!(reader.run(&Scope::current(), 21).await, 42);
/// # }
/// ```
pub struct AsyncReader<R, A>
where
    R: 'static,
    A: 'static,
{
    run_function: Arc<RunFunction<R, A>>,
}

impl<R, A> AsyncReader<R, A>
where
    R: Send + 'static,
    A: Send + 'static,
{
    /// Wraps an asynchronous function of the scope and the environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::{AsyncReader, Scope};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let reader: AsyncReader<u64, u64> = AsyncReader::new(|_scope: Scope, delay: u64| async move {
    ///     tokio::task::yield_now().await;
    ///     delay * 2
    /// });
    /// assert_eq!(reader.run(&Scope::current(), 21).await, 42);
    /// # }
    /// ```
    pub fn new<F, Fut>(function: F) -> Self
    where
        F: Fn(Scope, R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = A> + Send + 'static,
    {
        Self {
            run_function: Arc::new(move |scope: Scope, environment: R| {
                function(scope, environment).boxed()
            }),
        }
    }

    /// Wraps a synchronous function. It is invoked when the run is polled,
    /// not when [`AsyncReader::run`] is called.
    pub fn from_fn<F>(function: F) -> Self
    where
        F: Fn(R) -> A + Send + Sync + 'static,
    {
        let function = Arc::new(function);
        Self::new(move |_, environment| {
            let function = Arc::clone(&function);
            async move { function(environment) }
        })
    }

    /// Runs the reader on `environment` in a child scope of `scope`.
    ///
    /// Nothing is invoked until the returned future is polled. The future
    /// resolves once the reader has produced its value and every task
    /// spawned in the child scope has finished. It borrows neither the
    /// reader nor the scope.
    ///
    /// # Panics
    ///
    /// Panics if a task spawned through [`Scope::spawn`] in the child scope
    /// panicked, after all of its siblings have finished.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicBool, Ordering};
    ///
    /// use reader_kleisli::effect::{AsyncReader, Scope};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let flushed = Arc::new(AtomicBool::new(false));
    /// let flag = Arc::clone(&flushed);
    /// let reader: AsyncReader<(), ()> = AsyncReader::new(move |scope: Scope, ()| {
    ///     let flag = Arc::clone(&flag);
    ///     async move {
    ///         scope.spawn(async move { flag.store(true, Ordering::SeqCst) });
    ///     }
    /// });
    ///
    /// reader.run(&Scope::current(), ()).await;
    /// assert!(flushed.load(Ordering::SeqCst));
    /// # }
    /// ```
    pub fn run(&self, scope: &Scope, environment: R) -> BoxFuture<'static, A> {
        let run_function = Arc::clone(&self.run_function);
        let scope = scope.child();
        async move {
            let value = run_function(scope.clone(), environment).await;
            scope.join().await;
            value
        }
        .boxed()
    }

    /// A reader that ignores its environment and yields `value`.
    pub fn pure(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Self::new(move |_, _| future::ready(value.clone()))
    }

    /// Post-composes a synchronous function.
    pub fn fmap<B, F>(self, function: F) -> AsyncReader<R, B>
    where
        F: Fn(A) -> B + Send + Sync + 'static,
        B: Send + 'static,
    {
        let original = self.run_function;
        let function = Arc::new(function);
        AsyncReader::new(move |scope: Scope, environment: R| {
            let pending = original(scope, environment);
            let function = Arc::clone(&function);
            async move { function(pending.await) }
        })
    }

    /// Post-composes a suspendable function that also sees the scope.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::{AsyncReader, Scope};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let reader: AsyncReader<i32, i32> = AsyncReader::<i32, i32>::ask().fmap_async(|scope: Scope, value: i32| async move {
    ///     scope.spawn(async move { value + 1 }).await.unwrap()
    /// });
    /// assert_eq!(reader.run(&Scope::current(), 41).await, 42);
    /// # }
    /// ```
    pub fn fmap_async<B, F, Fut>(self, function: F) -> AsyncReader<R, B>
    where
        F: Fn(Scope, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = B> + Send + 'static,
        B: Send + 'static,
    {
        let original = self.run_function;
        let function = Arc::new(function);
        AsyncReader::new(move |scope: Scope, environment: R| {
            let pending = original(scope.clone(), environment);
            let function = Arc::clone(&function);
            async move {
                let value = pending.await;
                function(scope, value).await
            }
        })
    }

    /// Monadic bind: awaits this reader, feeds the value into `function` and
    /// runs the reader it returns on the same environment.
    ///
    /// Equivalent to `self.fmap(function).multiply()`.
    pub fn flat_map<B, F>(self, function: F) -> AsyncReader<R, B>
    where
        F: Fn(A) -> AsyncReader<R, B> + Send + Sync + 'static,
        B: Send + 'static,
        R: Clone,
    {
        self.fmap(function).multiply()
    }

    /// Alias for [`AsyncReader::flat_map`].
    pub fn and_then<B, F>(self, function: F) -> AsyncReader<R, B>
    where
        F: Fn(A) -> AsyncReader<R, B> + Send + Sync + 'static,
        B: Send + 'static,
        R: Clone,
    {
        self.flat_map(function)
    }

    /// Alias for [`AsyncReader::flat_map`].
    pub fn bind<B, F>(self, function: F) -> AsyncReader<R, B>
    where
        F: Fn(A) -> AsyncReader<R, B> + Send + Sync + 'static,
        B: Send + 'static,
        R: Clone,
    {
        self.flat_map(function)
    }

    /// Runs `self`, discards its result and continues with `next`.
    #[must_use]
    pub fn then<B>(self, next: AsyncReader<R, B>) -> AsyncReader<R, B>
    where
        B: Send + 'static,
        R: Clone,
    {
        self.flat_map(move |_| next.clone())
    }

    /// Runs both readers on the same environment, `self` first, and combines
    /// the results.
    pub fn map2<B, C, F>(self, other: AsyncReader<R, B>, function: F) -> AsyncReader<R, C>
    where
        F: Fn(A, B) -> C + Send + Sync + 'static,
        B: Send + 'static,
        C: Send + 'static,
        R: Clone,
    {
        let first = self.run_function;
        let second = other.run_function;
        let function = Arc::new(function);
        AsyncReader::new(move |scope: Scope, environment: R| {
            let pending = first(scope.clone(), environment.clone());
            let second = Arc::clone(&second);
            let function = Arc::clone(&function);
            async move {
                let a = pending.await;
                let b = second(scope, environment).await;
                function(a, b)
            }
        })
    }

    /// Pairs the results of two readers.
    #[must_use]
    pub fn product<B>(self, other: AsyncReader<R, B>) -> AsyncReader<R, (A, B)>
    where
        B: Send + 'static,
        R: Clone,
    {
        self.map2(other, |a, b| (a, b))
    }

    /// Applicative apply, defined as
    /// `self.flat_map(|function| values.fmap(function))`.
    ///
    /// The function reader is awaited before the value reader starts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::{AsyncReader, Scope};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let functions: AsyncReader<i32, Box<dyn Fn(i32) -> i32 + Send + Sync>> =
    ///     AsyncReader::from_fn(|environment| {
    ///         Box::new(move |x| x + environment) as Box<dyn Fn(i32) -> i32 + Send + Sync>
    ///     });
    /// let values: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment + 1);
    /// assert_eq!(functions.apply(values).run(&Scope::current(), 5).await, 11);
    /// # }
    /// ```
    #[must_use]
    pub fn apply<B, C>(self, values: AsyncReader<R, B>) -> AsyncReader<R, C>
    where
        A: Fn(B) -> C + Sync,
        B: Send + 'static,
        C: Send + 'static,
        R: Clone,
    {
        self.flat_map(move |function| values.clone().fmap(function))
    }

    /// Runs the reader as a separate task tracked by `scope`.
    ///
    /// The task starts immediately; the returned future resolves once it
    /// finishes. A panic of the task is reported through the returned future
    /// only, so it does not make `scope` panic when joined.
    ///
    /// # Errors
    ///
    /// The future resolves to [`SpawnError::Panicked`] if a wrapped function
    /// or a task spawned in the reader's scope panicked, and to
    /// [`SpawnError::Cancelled`] if the task was cancelled.
    pub fn spawn(&self, scope: &Scope, environment: R) -> BoxFuture<'static, Result<A, SpawnError>> {
        let task = scope.track(self.run(scope, environment));
        async move {
            task.await.map_err(|error| {
                let error = SpawnError::from(error);
                #[cfg(feature = "tracing")]
                tracing::debug!(%error, "spawned reader did not complete");
                error
            })
        }
        .boxed()
    }

    /// Runs the reader from synchronous code and blocks until it completes.
    ///
    /// The reader runs under the scope of the surrounding multi-thread
    /// runtime, or of the global runtime when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`BlockingError::CurrentThreadRuntime`] when called from a
    /// current-thread runtime. The reader is not run in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::AsyncReader;
    ///
    /// let reader: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment * 2);
    /// assert_eq!(reader.run_blocking(21), Ok(42));
    /// ```
    pub fn run_blocking(&self, environment: R) -> Result<A, BlockingError> {
        runtime::try_run_blocking(async { self.run(&Scope::current(), environment).await })
    }
}

// =============================================================================
// Monad Multiplication
// =============================================================================

impl<R, A> AsyncReader<R, AsyncReader<R, A>>
where
    R: Clone + Send + 'static,
    A: Send + 'static,
{
    /// Flattens a reader of readers: the outer reader is awaited on the
    /// environment, then the inner reader it produced is awaited on that same
    /// environment.
    #[must_use]
    pub fn multiply(self) -> AsyncReader<R, A> {
        AsyncReader::new(move |scope: Scope, environment: R| {
            let pending = self.run(&scope, environment.clone());
            async move {
                let inner = pending.await;
                inner.run(&scope, environment).await
            }
        })
    }
}

// =============================================================================
// MonadReader Operations
// =============================================================================

impl<Env> AsyncReader<Env, Env>
where
    Env: Send + 'static,
{
    /// A reader that yields the environment itself.
    #[must_use]
    pub fn ask() -> Self {
        Self::from_fn(|environment| environment)
    }
}

impl<R, A> AsyncReader<R, A>
where
    R: Send + 'static,
    A: Send + 'static,
{
    /// A reader that projects a value out of the environment.
    pub fn asks<F>(projection: F) -> Self
    where
        F: Fn(R) -> A + Send + Sync + 'static,
    {
        Self::from_fn(projection)
    }

    /// Runs `computation` on an environment rewritten by `modifier`.
    pub fn local<F>(modifier: F, computation: Self) -> Self
    where
        F: Fn(R) -> R + Send + Sync + 'static,
    {
        let inner = computation.run_function;
        Self::new(move |scope: Scope, environment: R| inner(scope, modifier(environment)))
    }
}

impl<R, A> Clone for AsyncReader<R, A>
where
    R: 'static,
    A: 'static,
{
    fn clone(&self) -> Self {
        Self {
            run_function: Arc::clone(&self.run_function),
        }
    }
}

impl<R, A> fmt::Display for AsyncReader<R, A>
where
    R: 'static,
    A: 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "<AsyncReader>")
    }
}

impl<R, A> fmt::Debug for AsyncReader<R, A>
where
    R: 'static,
    A: 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("AsyncReader").finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(AsyncReader<i32, String>: Send, Sync, Clone);
static_assertions::assert_impl_all!(Scope: Send, Sync, Clone);
