//! Kleisli arrows of the asynchronous Reader monad.

use std::fmt;
use std::future::Future;
use std::ops::Mul;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use super::{AsyncReader, Scope};

type Arrow<R, K, A> = dyn Fn(Scope, K) -> BoxFuture<'static, AsyncReader<R, A>> + Send + Sync;

/// A suspendable function from `K` to an [`AsyncReader`] over the
/// environment `R`.
///
/// Composition (`compose` or `*`) awaits the first arrow, then runs the
/// reader it produced, then awaits the second arrow on that reader's value
/// and finally runs the second reader, all on the same environment.
/// Composition is associative and [`AsyncKleisliReader::identity`] is a unit
/// on both sides.
///
/// # Examples
///
/// ```rust
/// use reader_kleisli::effect::{AsyncKleisliReader, AsyncReader, Scope};
///
/// # #[tokio::main]
/// # async fn main() {
/// let scale: AsyncKleisliReader<i32, i32, i32> = AsyncKleisliReader::from_fn(|value| {
///     AsyncReader::from_fn(move |factor| value * factor)
/// });
/// let describe: AsyncKleisliReader<i32, i32, String> =
///     AsyncKleisliReader::from_fn(|value| AsyncReader::pure(format!("value={value}")));
///
/// let scope = Scope::current();
/// let reader = (scale * describe).run(&scope, 7).await;
/// assert_eq!(reader.run(&scope, 3).await, "value=21");
/// # }
/// ```
pub struct AsyncKleisliReader<R, K, A>
where
    R: 'static,
    K: 'static,
    A: 'static,
{
    arrow: Arc<Arrow<R, K, A>>,
}

impl<R, K, A> AsyncKleisliReader<R, K, A>
where
    R: Send + 'static,
    K: Send + 'static,
    A: Send + 'static,
{
    /// Wraps a suspendable function that produces a reader.
    pub fn new<F, Fut>(arrow: F) -> Self
    where
        F: Fn(Scope, K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AsyncReader<R, A>> + Send + 'static,
    {
        Self {
            arrow: Arc::new(move |scope: Scope, input: K| arrow(scope, input).boxed()),
        }
    }

    /// Wraps a synchronous function that produces a reader.
    pub fn from_fn<F>(arrow: F) -> Self
    where
        F: Fn(K) -> AsyncReader<R, A> + Send + Sync + 'static,
    {
        let arrow = Arc::new(arrow);
        Self::new(move |_, input| {
            let arrow = Arc::clone(&arrow);
            async move { arrow(input) }
        })
    }

    /// Applies the arrow to `input` under `scope`.
    ///
    /// The arrow is invoked when the returned future is first polled. Tasks
    /// it spawns belong to `scope`.
    pub fn run(&self, scope: &Scope, input: K) -> BoxFuture<'static, AsyncReader<R, A>> {
        let arrow = Arc::clone(&self.arrow);
        let scope = scope.clone();
        async move { arrow(scope, input).await }.boxed()
    }

    /// Kleisli composition: `self` first, then `next`.
    #[must_use]
    pub fn compose<B>(self, next: AsyncKleisliReader<R, A, B>) -> AsyncKleisliReader<R, K, B>
    where
        R: Clone,
        B: Send + 'static,
    {
        let first = self.arrow;
        AsyncKleisliReader::new(move |scope: Scope, input: K| {
            let pending = first(scope, input);
            let next = next.clone();
            async move {
                pending
                    .await
                    .fmap_async(move |scope: Scope, value: A| next.run(&scope, value))
                    .multiply()
            }
        })
    }

    /// Post-composes a synchronous function onto the readers this arrow
    /// produces.
    pub fn fmap<B, F>(self, function: F) -> AsyncKleisliReader<R, K, B>
    where
        F: Fn(A) -> B + Send + Sync + 'static,
        B: Send + 'static,
    {
        let arrow = self.arrow;
        let function = Arc::new(function);
        AsyncKleisliReader::new(move |scope: Scope, input: K| {
            let pending = arrow(scope, input);
            let function = Arc::clone(&function);
            async move { pending.await.fmap(move |value| function(value)) }
        })
    }
}

impl<R, A> AsyncKleisliReader<R, A, A>
where
    R: Send + 'static,
    A: Clone + Send + Sync + 'static,
{
    /// The identity arrow, `|value| AsyncReader::pure(value)`.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(|_, value| future::ready(AsyncReader::pure(value)))
    }
}

impl<R, K, A, B> Mul<AsyncKleisliReader<R, A, B>> for AsyncKleisliReader<R, K, A>
where
    R: Clone + Send + 'static,
    K: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
{
    type Output = AsyncKleisliReader<R, K, B>;

    fn mul(self, next: AsyncKleisliReader<R, A, B>) -> Self::Output {
        self.compose(next)
    }
}

impl<R, K, A> Clone for AsyncKleisliReader<R, K, A>
where
    R: 'static,
    K: 'static,
    A: 'static,
{
    fn clone(&self) -> Self {
        Self {
            arrow: Arc::clone(&self.arrow),
        }
    }
}

impl<R, K, A> fmt::Display for AsyncKleisliReader<R, K, A>
where
    R: 'static,
    K: 'static,
    A: 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "<AsyncKleisliReader>")
    }
}

static_assertions::assert_impl_all!(AsyncKleisliReader<i32, i32, String>: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;

    #[rstest]
    fn display_renders_placeholder() {
        let identity: AsyncKleisliReader<i32, i32, i32> = AsyncKleisliReader::identity();
        assert_eq!(format!("{identity}"), "<AsyncKleisliReader>");
    }

    #[rstest]
    #[tokio::test]
    async fn compose_evaluates_left_to_right() {
        let trace = Arc::new(Mutex::new(Vec::new()));

        let first_trace = Arc::clone(&trace);
        let first: AsyncKleisliReader<i32, i32, i32> =
            AsyncKleisliReader::new(move |_, value: i32| {
                let trace = Arc::clone(&first_trace);
                async move {
                    trace.lock().unwrap().push("first arrow");
                    let reader_trace = Arc::clone(&trace);
                    AsyncReader::from_fn(move |environment: i32| {
                        reader_trace.lock().unwrap().push("first reader");
                        value + environment
                    })
                }
            });

        let second_trace = Arc::clone(&trace);
        let second: AsyncKleisliReader<i32, i32, i32> =
            AsyncKleisliReader::new(move |_, value: i32| {
                let trace = Arc::clone(&second_trace);
                async move {
                    trace.lock().unwrap().push("second arrow");
                    let reader_trace = Arc::clone(&trace);
                    AsyncReader::from_fn(move |environment: i32| {
                        reader_trace.lock().unwrap().push("second reader");
                        value * environment
                    })
                }
            });

        let scope = Scope::current();
        let reader = (first * second).run(&scope, 1).await;
        assert_eq!(*trace.lock().unwrap(), vec!["first arrow"]);

        assert_eq!(reader.run(&scope, 10).await, 110);
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["first arrow", "first reader", "second arrow", "second reader"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn run_defers_the_arrow_until_polled() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let arrow: AsyncKleisliReader<i32, i32, i32> = AsyncKleisliReader::new(move |_, value: i32| {
            *counter.lock().unwrap() += 1;
            future::ready(AsyncReader::pure(value))
        });

        let scope = Scope::current();
        let pending = arrow.run(&scope, 2);
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(pending.await.run(&scope, 0).await, 2);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn fmap_transforms_produced_reader() {
        let arrow: AsyncKleisliReader<i32, i32, i32> =
            AsyncKleisliReader::from_fn(|value| AsyncReader::from_fn(move |environment| value - environment));
        let scope = Scope::current();
        let reader = arrow.fmap(|value| value.abs()).run(&scope, 1).await;
        assert_eq!(reader.run(&scope, 5).await, 4);
    }
}
