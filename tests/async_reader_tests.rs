#![cfg(feature = "async")]
//! Tests for AsyncReader and AsyncKleisliReader.
//!
//! - Construction and running under a scope
//! - Functor, applicative and monad operations
//! - Evaluation order of composite readers
//! - Scope lifetime of a run
//! - Spawning and blocking runs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reader_kleisli::effect::{
    AsyncKleisliReader, AsyncReader, BlockingError, Scope, SpawnError,
};
use rstest::rstest;

fn scope() -> Scope {
    Scope::current()
}

type Trace = Arc<Mutex<Vec<&'static str>>>;

fn traced(trace: &Trace, label: &'static str, value: i32) -> AsyncReader<i32, i32> {
    let trace = Arc::clone(trace);
    AsyncReader::new(move |_, environment: i32| {
        let trace = Arc::clone(&trace);
        async move {
            tokio::task::yield_now().await;
            trace.lock().unwrap().push(label);
            value + environment
        }
    })
}

// =============================================================================
// Construction and Running
// =============================================================================

#[rstest]
#[tokio::test]
async fn from_fn_and_run() {
    let reader: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment * 2);
    assert_eq!(reader.run(&scope(), 21).await, 42);
}

#[rstest]
#[tokio::test]
async fn new_may_suspend() {
    let reader: AsyncReader<u64, u64> = AsyncReader::new(|_, millis: u64| async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        millis
    });
    assert_eq!(reader.run(&scope(), 1).await, 1);
}

#[rstest]
#[tokio::test]
async fn pure_ignores_environment() {
    let reader: AsyncReader<i32, &str> = AsyncReader::pure("constant");
    assert_eq!(reader.run(&scope(), 1).await, "constant");
    assert_eq!(reader.run(&scope(), 2).await, "constant");
}

// =============================================================================
// Functor / Applicative / Monad
// =============================================================================

#[rstest]
#[tokio::test]
async fn concrete_bind_scenario() {
    let increment: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment + 1);
    let bound = increment.bind(|sum| AsyncReader::from_fn(move |environment| sum + environment));
    assert_eq!(bound.run(&scope(), 10).await, 21);
}

#[rstest]
#[tokio::test]
async fn concrete_apply_scenario() {
    let increment: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment + 1);
    let add_environment: AsyncReader<i32, Box<dyn Fn(i32) -> i32 + Send + Sync>> =
        AsyncReader::from_fn(|environment| {
            Box::new(move |x: i32| x + environment) as Box<dyn Fn(i32) -> i32 + Send + Sync>
        });
    assert_eq!(add_environment.apply(increment).run(&scope(), 5).await, 11);
}

#[rstest]
#[tokio::test]
async fn fmap_async_receives_scope() {
    let reader: AsyncReader<i32, i32> =
        AsyncReader::<i32, i32>::ask().fmap_async(|scope: Scope, value: i32| async move {
            scope.spawn(async move { value * 3 }).await.unwrap()
        });
    assert_eq!(reader.run(&scope(), 5).await, 15);
}

#[rstest]
#[tokio::test]
async fn map2_product_then() {
    let identity: AsyncReader<i32, i32> = AsyncReader::ask();
    let doubled: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment * 2);

    assert_eq!(
        identity
            .clone()
            .map2(doubled.clone(), |a, b| a + b)
            .run(&scope(), 10)
            .await,
        30
    );
    assert_eq!(
        identity.clone().product(doubled).run(&scope(), 4).await,
        (4, 8)
    );
    assert_eq!(
        identity.then(AsyncReader::pure("next")).run(&scope(), 4).await,
        "next"
    );
}

#[rstest]
#[tokio::test]
async fn multiply_applies_environment_twice() {
    let nested: AsyncReader<String, AsyncReader<String, String>> =
        AsyncReader::from_fn(|outer: String| {
            AsyncReader::from_fn(move |inner: String| format!("{outer}/{inner}"))
        });
    assert_eq!(
        nested.multiply().run(&scope(), "env".to_string()).await,
        "env/env"
    );
}

#[rstest]
#[tokio::test]
async fn asks_and_local() {
    #[derive(Clone)]
    struct Config {
        depth: u32,
    }

    let depth: AsyncReader<Config, u32> = AsyncReader::asks(|config: Config| config.depth);
    let deeper = AsyncReader::local(
        |config: Config| Config {
            depth: config.depth + 1,
        },
        depth.clone(),
    );

    let (outer, inner) = depth.product(deeper).run(&scope(), Config { depth: 1 }).await;
    assert_eq!((outer, inner), (1, 2));
}

// =============================================================================
// Evaluation Order
// =============================================================================

#[rstest]
#[tokio::test]
async fn map2_evaluates_left_to_right() {
    let trace: Trace = Arc::default();
    let combined = traced(&trace, "left", 1).map2(traced(&trace, "right", 2), |a, b| a * b);

    assert_eq!(combined.run(&scope(), 10).await, 11 * 12);
    assert_eq!(*trace.lock().unwrap(), vec!["left", "right"]);
}

#[rstest]
#[tokio::test]
async fn apply_awaits_function_reader_before_value_reader() {
    let trace: Trace = Arc::default();
    let functions = traced(&trace, "function", 0).fmap(|offset| move |x: i32| x - offset);
    let values = traced(&trace, "value", 5);

    assert_eq!(functions.apply(values).run(&scope(), 10).await, 5);
    assert_eq!(*trace.lock().unwrap(), vec!["function", "value"]);
}

#[rstest]
#[tokio::test]
async fn flat_map_awaits_outer_before_inner() {
    let trace: Trace = Arc::default();
    let inner_trace = Arc::clone(&trace);
    let bound = traced(&trace, "outer", 0).flat_map(move |value| traced(&inner_trace, "inner", value));

    assert_eq!(bound.run(&scope(), 3).await, 6);
    assert_eq!(*trace.lock().unwrap(), vec!["outer", "inner"]);
}

// =============================================================================
// Scope Lifetime
// =============================================================================

fn spawns_unawaited_child(done: &Arc<AtomicBool>) -> AsyncReader<u64, u64> {
    let done = Arc::clone(done);
    AsyncReader::new(move |scope: Scope, millis: u64| {
        let done = Arc::clone(&done);
        async move {
            scope.spawn(async move {
                tokio::time::sleep(Duration::from_millis(millis)).await;
                done.store(true, Ordering::SeqCst);
            });
            millis
        }
    })
}

#[rstest]
#[tokio::test]
async fn run_waits_for_children_spawned_in_its_scope() {
    let done = Arc::new(AtomicBool::new(false));
    let reader = spawns_unawaited_child(&done);

    assert_eq!(reader.run(&scope(), 50).await, 50);
    assert!(done.load(Ordering::SeqCst));
}

#[rstest]
#[tokio::test]
async fn composite_reader_waits_for_children_of_every_step() {
    let done = Arc::new(AtomicBool::new(false));
    let reader = AsyncReader::<u64, u64>::ask()
        .flat_map({
            let done = Arc::clone(&done);
            move |_| spawns_unawaited_child(&done)
        })
        .fmap(|millis| millis * 2);

    assert_eq!(reader.run(&scope(), 20).await, 40);
    assert!(done.load(Ordering::SeqCst));
}

#[tokio::test]
#[should_panic(expected = "child failed")]
async fn run_raises_panic_of_child() {
    let reader: AsyncReader<i32, i32> = AsyncReader::new(|scope: Scope, environment: i32| async move {
        scope.spawn(async move {
            assert!(environment > 0, "child failed");
        });
        environment
    });
    reader.run(&scope(), 0).await;
}

#[rstest]
#[tokio::test]
async fn spawn_reports_panic_of_child_as_error() {
    let reader: AsyncReader<i32, i32> = AsyncReader::new(|scope: Scope, environment: i32| async move {
        scope.spawn(async move {
            assert!(environment > 0, "child failed");
        });
        environment
    });
    assert_eq!(
        reader.spawn(&scope(), 0).await,
        Err(SpawnError::Panicked("child failed".to_string()))
    );
}

// =============================================================================
// Spawning and Blocking
// =============================================================================

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawn_returns_value() {
    let reader: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment + 1);
    assert_eq!(reader.spawn(&scope(), 41).await, Ok(42));
}

#[rstest]
#[tokio::test]
async fn spawn_reports_panic_as_error() {
    let reader: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment: i32| {
        assert!(environment >= 0, "negative environment");
        environment
    });
    assert_eq!(
        reader.spawn(&scope(), -1).await,
        Err(SpawnError::Panicked("negative environment".to_string()))
    );
}

#[rstest]
fn run_blocking_outside_runtime() {
    let reader: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment * 2);
    assert_eq!(reader.run_blocking(21), Ok(42));
}

#[rstest]
#[tokio::test(flavor = "current_thread")]
async fn run_blocking_inside_current_thread_runtime_fails() {
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let reader: AsyncReader<i32, i32> = AsyncReader::from_fn(move |environment| {
        *counter.lock().unwrap() += 1;
        environment
    });

    assert_eq!(
        reader.run_blocking(1),
        Err(BlockingError::CurrentThreadRuntime)
    );
    assert_eq!(*calls.lock().unwrap(), 0);
}

// =============================================================================
// AsyncKleisliReader
// =============================================================================

#[rstest]
#[tokio::test]
async fn kleisli_identity_is_two_sided_unit() {
    let add: AsyncKleisliReader<i32, i32, i32> = AsyncKleisliReader::from_fn(|value: i32| {
        AsyncReader::from_fn(move |environment: i32| value + environment)
    });
    let identity: AsyncKleisliReader<i32, i32, i32> = AsyncKleisliReader::identity();
    let scope = scope();

    let expected = add.run(&scope, 2).await.run(&scope, 5).await;
    let left = (identity.clone() * add.clone()).run(&scope, 2).await;
    let right = (add * identity).run(&scope, 2).await;

    assert_eq!(left.run(&scope, 5).await, expected);
    assert_eq!(right.run(&scope, 5).await, expected);
}

#[rstest]
#[tokio::test]
async fn kleisli_arrow_may_suspend() {
    let delayed: AsyncKleisliReader<i32, u64, u64> =
        AsyncKleisliReader::new(|_, millis: u64| async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            AsyncReader::from_fn(move |environment: i32| millis + u64::from(environment.unsigned_abs()))
        });
    let scope = scope();
    let reader = delayed.run(&scope, 1).await;
    assert_eq!(reader.run(&scope, -4).await, 5);
}

#[rstest]
fn display() {
    let reader: AsyncReader<i32, i32> = AsyncReader::ask();
    let arrow: AsyncKleisliReader<i32, i32, i32> = AsyncKleisliReader::identity();
    assert_eq!(reader.to_string(), "<AsyncReader>");
    assert_eq!(arrow.to_string(), "<AsyncKleisliReader>");
}
