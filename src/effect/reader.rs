//! Reader Monad - computations that read a shared environment.
//!
//! A `Reader<R, A>` holds a function `R -> A`. Composing readers builds a
//! larger function that hands the same environment to every step, so
//! configuration or dependencies never have to be passed by hand.
//!
//! # Laws
//!
//! ## Functor Laws
//!
//! - Identity: `reader.fmap(|x| x) == reader`
//! - Composition: `reader.fmap(f).fmap(g) == reader.fmap(|x| g(f(x)))`
//!
//! ## Monad Laws
//!
//! - Left Identity: `Reader::pure(a).flat_map(f) == f(a)`
//! - Right Identity: `m.flat_map(Reader::pure) == m`
//! - Associativity: `m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))`
//!
//! Equality here means "runs to the same value for every environment".
//!
//! # Multiplication
//!
//! [`Reader::multiply`] flattens a `Reader<R, Reader<R, A>>`. The outer reader
//! runs on the environment to produce the inner reader, which then runs on
//! that same environment again. `flat_map` is `fmap` followed by `multiply`.
//!
//! # Examples
//!
//! ```rust
//! use reader_kleisli::effect::Reader;
//!
//! #[derive(Clone)]
//! struct Config {
//!     port: u16,
//!     host: String,
//! }
//!
//! fn address() -> Reader<Config, String> {
//!     Reader::asks(|config: Config| config.host)
//!         .map2(Reader::asks(|config: Config| config.port), |host, port| {
//!             format!("{host}:{port}")
//!         })
//! }
//!
//! let config = Config { port: 8080, host: "localhost".to_string() };
//! assert_eq!(address().run(config), "localhost:8080");
//! ```

#![forbid(unsafe_code)]

use std::fmt;
use std::rc::Rc;

/// A computation that produces an `A` from an environment `R`.
///
/// Cloning a `Reader` is cheap: clones share the wrapped function.
/// Nothing is cached between runs.
///
/// # Examples
///
/// ```rust
/// use reader_kleisli::effect::Reader;
///
/// let reader: Reader<i32, i32> = Reader::<i32, i32>::ask().flat_map(|environment| Reader::pure(environment * 2));
/// assert_eq!(reader.run(21), 42);
/// ```
pub struct Reader<R, A>
where
    R: 'static,
    A: 'static,
{
    run_function: Rc<dyn Fn(R) -> A>,
}

impl<R, A> Reader<R, A>
where
    R: 'static,
    A: 'static,
{
    /// Wraps a function from the environment to a result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let reader: Reader<i32, i32> = Reader::new(|environment| environment * 2);
    /// assert_eq!(reader.run(21), 42);
    /// ```
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(R) -> A + 'static,
    {
        Self {
            run_function: Rc::new(function),
        }
    }

    /// Runs the wrapped function on `environment`.
    ///
    /// A panic raised by the wrapped function propagates unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let reader: Reader<i32, i32> = Reader::new(|environment| environment + 1);
    /// assert_eq!(reader.run(41), 42);
    /// assert_eq!(reader.run(0), 1);
    /// ```
    pub fn run(&self, environment: R) -> A {
        (self.run_function)(environment)
    }

    /// A reader that ignores its environment and yields `value`.
    ///
    /// This is the unit (`return`) of the monad.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let reader: Reader<i32, &str> = Reader::pure("constant");
    /// assert_eq!(reader.run(0), "constant");
    /// assert_eq!(reader.run(100), "constant");
    /// ```
    pub fn pure(value: A) -> Self
    where
        A: Clone,
    {
        Self::new(move |_| value.clone())
    }

    /// Post-composes `function` onto the wrapped function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let reader: Reader<i32, String> = Reader::ask().fmap(|value: i32| value.to_string());
    /// assert_eq!(reader.run(42), "42");
    /// ```
    pub fn fmap<B, F>(self, function: F) -> Reader<R, B>
    where
        F: Fn(A) -> B + 'static,
        B: 'static,
    {
        let original = self.run_function;
        Reader::new(move |environment| function(original(environment)))
    }

    /// Monadic bind: feeds the result into `function` and runs the reader it
    /// returns on the same environment.
    ///
    /// Equivalent to `self.fmap(function).multiply()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let reader: Reader<i32, i32> = Reader::new(|environment| environment + 1);
    /// let bound = reader.flat_map(|sum| Reader::new(move |environment| sum + environment));
    /// assert_eq!(bound.run(10), 21);
    /// ```
    pub fn flat_map<B, F>(self, function: F) -> Reader<R, B>
    where
        F: Fn(A) -> Reader<R, B> + 'static,
        B: 'static,
        R: Clone,
    {
        self.fmap(function).multiply()
    }

    /// Alias for [`Reader::flat_map`].
    pub fn and_then<B, F>(self, function: F) -> Reader<R, B>
    where
        F: Fn(A) -> Reader<R, B> + 'static,
        B: 'static,
        R: Clone,
    {
        self.flat_map(function)
    }

    /// Alias for [`Reader::flat_map`].
    pub fn bind<B, F>(self, function: F) -> Reader<R, B>
    where
        F: Fn(A) -> Reader<R, B> + 'static,
        B: 'static,
        R: Clone,
    {
        self.flat_map(function)
    }

    /// Runs `self`, discards its result and continues with `next`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let reader: Reader<i32, i32> = Reader::ask();
    /// assert_eq!(reader.then(Reader::pure("done")).run(42), "done");
    /// ```
    #[must_use]
    pub fn then<B>(self, next: Reader<R, B>) -> Reader<R, B>
    where
        B: 'static,
        R: Clone,
    {
        self.flat_map(move |_| next.clone())
    }

    /// Runs both readers on the same environment and combines the results.
    ///
    /// `self` runs before `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let first: Reader<i32, i32> = Reader::new(|environment| environment);
    /// let second: Reader<i32, i32> = Reader::new(|environment| environment * 2);
    /// assert_eq!(first.map2(second, |a, b| a + b).run(10), 30);
    /// ```
    pub fn map2<B, C, F>(self, other: Reader<R, B>, function: F) -> Reader<R, C>
    where
        F: Fn(A, B) -> C + 'static,
        B: 'static,
        C: 'static,
        R: Clone,
    {
        let first = self.run_function;
        let second = other.run_function;
        Reader::new(move |environment: R| {
            let a = first(environment.clone());
            let b = second(environment);
            function(a, b)
        })
    }

    /// Three-way [`Reader::map2`].
    pub fn map3<B, C, D, F>(
        self,
        second: Reader<R, B>,
        third: Reader<R, C>,
        function: F,
    ) -> Reader<R, D>
    where
        F: Fn(A, B, C) -> D + 'static,
        B: 'static,
        C: 'static,
        D: 'static,
        R: Clone,
    {
        let first = self.run_function;
        let second = second.run_function;
        let third = third.run_function;
        Reader::new(move |environment: R| {
            let a = first(environment.clone());
            let b = second(environment.clone());
            let c = third(environment);
            function(a, b, c)
        })
    }

    /// Pairs the results of two readers.
    #[must_use]
    pub fn product<B>(self, other: Reader<R, B>) -> Reader<R, (A, B)>
    where
        B: 'static,
        R: Clone,
    {
        self.map2(other, |a, b| (a, b))
    }

    /// Applicative apply: runs the function reader and the value reader on
    /// the same environment and applies one result to the other.
    ///
    /// The function reader runs first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let functions: Reader<i32, Box<dyn Fn(i32) -> i32>> =
    ///     Reader::new(|environment| Box::new(move |x| x + environment) as Box<dyn Fn(i32) -> i32>);
    /// let values: Reader<i32, i32> = Reader::new(|environment| environment + 1);
    /// assert_eq!(functions.apply(values).run(5), 11);
    /// ```
    #[must_use]
    pub fn apply<B, C>(self, values: Reader<R, B>) -> Reader<R, C>
    where
        A: Fn(B) -> C,
        B: 'static,
        C: 'static,
        R: Clone,
    {
        self.map2(values, |function, value| function(value))
    }
}

// =============================================================================
// Monad Multiplication
// =============================================================================

impl<R, A> Reader<R, Reader<R, A>>
where
    R: Clone + 'static,
    A: 'static,
{
    /// Flattens a reader of readers.
    ///
    /// The outer reader runs on the environment and the inner reader it
    /// yields runs on that same environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let nested: Reader<i32, Reader<i32, i32>> =
    ///     Reader::new(|outer| Reader::new(move |inner| outer * 100 + inner));
    /// assert_eq!(nested.multiply().run(3), 303);
    /// ```
    #[must_use]
    pub fn multiply(self) -> Reader<R, A> {
        let outer = self.run_function;
        Reader::new(move |environment: R| outer(environment.clone()).run(environment))
    }
}

// =============================================================================
// MonadReader Operations
// =============================================================================

impl<Env> Reader<Env, Env>
where
    Env: 'static,
{
    /// A reader that yields the environment itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let reader: Reader<i32, i32> = Reader::ask();
    /// assert_eq!(reader.run(42), 42);
    /// ```
    #[must_use]
    pub fn ask() -> Self {
        Self::new(|environment| environment)
    }
}

impl<R, A> Reader<R, A>
where
    R: 'static,
    A: 'static,
{
    /// A reader that projects a value out of the environment.
    pub fn asks<F>(projection: F) -> Self
    where
        F: Fn(R) -> A + 'static,
    {
        Self::new(projection)
    }

    /// Runs `computation` on an environment rewritten by `modifier`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::Reader;
    ///
    /// let reader: Reader<i32, i32> = Reader::new(|environment| environment * 2);
    /// assert_eq!(Reader::local(|environment| environment + 10, reader).run(5), 30);
    /// ```
    pub fn local<F>(modifier: F, computation: Self) -> Self
    where
        F: Fn(R) -> R + 'static,
    {
        let inner = computation.run_function;
        Self::new(move |environment| inner(modifier(environment)))
    }
}

impl<R, A> Clone for Reader<R, A>
where
    R: 'static,
    A: 'static,
{
    fn clone(&self) -> Self {
        Self {
            run_function: Rc::clone(&self.run_function),
        }
    }
}

impl<R, A> fmt::Display for Reader<R, A>
where
    R: 'static,
    A: 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "<Reader>")
    }
}

impl<R, A> fmt::Debug for Reader<R, A>
where
    R: 'static,
    A: 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Reader").finish_non_exhaustive()
    }
}

static_assertions::assert_not_impl_any!(Reader<i32, i32>: Send, Sync);
