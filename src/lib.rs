//! # reader-kleisli
//!
//! The Reader monad and its Kleisli arrows, in a synchronous and an
//! asynchronous flavour.
//!
//! ## Overview
//!
//! A Reader wraps a function from an environment to a result. Readers compose
//! through `fmap`, `apply` and `flat_map` while the environment is threaded
//! through every step implicitly. A Kleisli reader is a function from an input
//! to a Reader; Kleisli readers compose like ordinary functions with `*`.
//!
//! - **Synchronous**: [`Reader`](effect::Reader) and
//!   [`KleisliReader`](effect::KleisliReader)
//! - **Asynchronous**: [`AsyncReader`](effect::AsyncReader) and
//!   [`AsyncKleisliReader`](effect::AsyncKleisliReader), evaluated under a
//!   caller-supplied [`Scope`](effect::Scope)
//! - **Do-notation**: the [`eff!`] macro
//!
//! ## Feature Flags
//!
//! - `effect`: Synchronous readers and the `eff!` macro
//! - `async`: Asynchronous readers on top of tokio
//! - `tracing`: Emit `tracing` events at the runtime boundary
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use reader_kleisli::prelude::*;
//!
//! let increment: Reader<i32, i32> = Reader::new(|environment| environment + 1);
//! let summed = increment.flat_map(|value| Reader::new(move |environment| value + environment));
//! assert_eq!(summed.run(10), 21);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use reader_kleisli::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "effect")]
    pub use crate::effect::*;
}

#[cfg(feature = "effect")]
pub mod effect;
