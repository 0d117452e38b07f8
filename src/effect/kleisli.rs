//! Kleisli arrows of the Reader monad.
//!
//! A `KleisliReader<R, K, A>` is a function `K -> Reader<R, A>`. Arrows whose
//! types line up compose with [`KleisliReader::compose`] (or `*`), which runs
//! the first arrow, maps the second over the reader it produced and flattens
//! the result. Composition is associative and [`KleisliReader::identity`] is
//! a unit on both sides:
//!
//! - `(a * b) * c == a * (b * c)`
//! - `identity() * a == a == a * identity()`

#![forbid(unsafe_code)]

use std::fmt;
use std::ops::Mul;
use std::rc::Rc;

use super::Reader;

/// A function from `K` to a [`Reader`] over the environment `R`.
///
/// # Examples
///
/// ```rust
/// use reader_kleisli::effect::{KleisliReader, Reader};
///
/// let scale: KleisliReader<i32, i32, i32> =
///     KleisliReader::new(|value| Reader::new(move |factor| value * factor));
/// let describe: KleisliReader<i32, i32, String> =
///     KleisliReader::new(|value| Reader::pure(format!("value={value}")));
///
/// let pipeline = scale * describe;
/// assert_eq!(pipeline.run(7).run(3), "value=21");
/// ```
pub struct KleisliReader<R, K, A>
where
    R: 'static,
    K: 'static,
    A: 'static,
{
    arrow: Rc<dyn Fn(K) -> Reader<R, A>>,
}

impl<R, K, A> KleisliReader<R, K, A>
where
    R: 'static,
    K: 'static,
    A: 'static,
{
    /// Wraps a function that produces a reader.
    pub fn new<F>(arrow: F) -> Self
    where
        F: Fn(K) -> Reader<R, A> + 'static,
    {
        Self {
            arrow: Rc::new(arrow),
        }
    }

    /// Applies the arrow to `input`.
    ///
    /// The returned reader still has to be run on an environment.
    pub fn run(&self, input: K) -> Reader<R, A> {
        (self.arrow)(input)
    }

    /// Kleisli composition: `self` first, then `next`.
    ///
    /// For an input `k`, the composite runs `self` on `k`, maps `next` over
    /// the resulting reader and multiplies the nested reader away.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::{KleisliReader, Reader};
    ///
    /// let add: KleisliReader<i32, i32, i32> =
    ///     KleisliReader::new(|value| Reader::new(move |environment| value + environment));
    /// let negate: KleisliReader<i32, i32, i32> = KleisliReader::new(|value: i32| Reader::pure(-value));
    ///
    /// assert_eq!(add.compose(negate).run(1).run(2), -3);
    /// ```
    #[must_use]
    pub fn compose<B>(self, next: KleisliReader<R, A, B>) -> KleisliReader<R, K, B>
    where
        R: Clone,
        B: 'static,
    {
        let first = self.arrow;
        KleisliReader::new(move |input| {
            let next = next.clone();
            first(input).fmap(move |value| next.run(value)).multiply()
        })
    }

    /// Post-composes a plain function onto the readers this arrow produces.
    pub fn fmap<B, F>(self, function: F) -> KleisliReader<R, K, B>
    where
        F: Fn(A) -> B + 'static,
        B: 'static,
    {
        let arrow = self.arrow;
        let function = Rc::new(function);
        KleisliReader::new(move |input| {
            let function = Rc::clone(&function);
            arrow(input).fmap(move |value| function(value))
        })
    }
}

impl<R, A> KleisliReader<R, A, A>
where
    R: 'static,
    A: Clone + 'static,
{
    /// The identity arrow, `|value| Reader::pure(value)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reader_kleisli::effect::{KleisliReader, Reader};
    ///
    /// let add: KleisliReader<i32, i32, i32> =
    ///     KleisliReader::new(|value| Reader::new(move |environment| value + environment));
    ///
    /// let identity: KleisliReader<i32, i32, i32> = KleisliReader::identity();
    /// let left = identity.clone() * add.clone();
    /// let right = add.clone() * identity;
    /// assert_eq!(left.run(1).run(2), add.run(1).run(2));
    /// assert_eq!(right.run(1).run(2), add.run(1).run(2));
    /// ```
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Reader::pure)
    }
}

impl<R, K, A, B> Mul<KleisliReader<R, A, B>> for KleisliReader<R, K, A>
where
    R: Clone + 'static,
    K: 'static,
    A: 'static,
    B: 'static,
{
    type Output = KleisliReader<R, K, B>;

    fn mul(self, next: KleisliReader<R, A, B>) -> Self::Output {
        self.compose(next)
    }
}

impl<R, K, A> Clone for KleisliReader<R, K, A>
where
    R: 'static,
    K: 'static,
    A: 'static,
{
    fn clone(&self) -> Self {
        Self {
            arrow: Rc::clone(&self.arrow),
        }
    }
}

impl<R, K, A> fmt::Display for KleisliReader<R, K, A>
where
    R: 'static,
    K: 'static,
    A: 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "<KleisliReader>")
    }
}
