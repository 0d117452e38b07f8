//! Readers and Kleisli readers.
//!
//! # Synchronous
//!
//! - [`Reader`]: a function from an environment to a result
//! - [`KleisliReader`]: a function from an input to a [`Reader`]
//!
//! ```rust
//! use reader_kleisli::effect::{KleisliReader, Reader};
//!
//! let add_environment: KleisliReader<i32, i32, i32> =
//!     KleisliReader::new(|value| Reader::new(move |environment| value + environment));
//! let double: KleisliReader<i32, i32, i32> =
//!     KleisliReader::new(|value| Reader::pure(value * 2));
//!
//! let composed = add_environment * double;
//! assert_eq!(composed.run(1).run(10), 22);
//! ```
//!
//! # Asynchronous
//!
//! [`AsyncReader`] and [`AsyncKleisliReader`] carry the same operations, but
//! every wrapped function is evaluated inside a future under a
//! caller-supplied [`Scope`].
//!
//! ```rust
//! use reader_kleisli::effect::{AsyncReader, Scope};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let reader: AsyncReader<i32, i32> = AsyncReader::from_fn(|environment| environment + 1)
//!     .flat_map(|value| AsyncReader::from_fn(move |environment| value + environment));
//!
//! let scope = Scope::current();
//! assert_eq!(reader.run(&scope, 10).await, 21);
//! # }
//! ```
//!
//! # Do-Notation with eff! Macro
//!
//! ```rust
//! use reader_kleisli::eff;
//! use reader_kleisli::effect::Reader;
//!
//! let computation: Reader<i32, i32> = eff! {
//!     environment <= Reader::<i32, i32>::ask();
//!     let doubled = environment * 2;
//!     Reader::pure(doubled + 1)
//! };
//! assert_eq!(computation.run(10), 21);
//! ```

// =============================================================================
// Synchronous Readers
// =============================================================================

mod kleisli;
mod reader;

pub use kleisli::KleisliReader;
pub use reader::Reader;

// =============================================================================
// Asynchronous Readers (requires async feature)
// =============================================================================

#[cfg(feature = "async")]
mod async_reader;

#[cfg(feature = "async")]
mod error;

#[cfg(feature = "async")]
pub use async_reader::{AsyncKleisliReader, AsyncReader, Scope, runtime};

#[cfg(feature = "async")]
pub use error::SpawnError;

#[cfg(feature = "async")]
pub use async_reader::runtime::BlockingError;

// =============================================================================
// Do-Notation Macros
// =============================================================================

mod eff_macro;
