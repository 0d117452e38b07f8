//! `eff!`: do-notation for readers.
//!
//! Each `pattern <= reader;` line binds the value of a reader and the rest of
//! the block becomes the continuation passed to `flat_map`. The block ends
//! with a reader expression. Works with every type that has an inherent
//! `flat_map`, so both [`Reader`](crate::effect::Reader) and
//! `AsyncReader` are supported.
//!
//! - `pattern <= reader;` binds (identifier, tuple or `_`)
//! - `let pattern = expression;` is a plain binding
//! - the final expression must itself be a reader
//!
//! `<-` is not a valid macro token, so `<=` stands in for it.
//!
//! ```rust
//! use reader_kleisli::eff;
//! use reader_kleisli::effect::Reader;
//!
//! #[derive(Clone)]
//! struct Config {
//!     width: u32,
//!     height: u32,
//! }
//!
//! let area: Reader<Config, u32> = eff! {
//!     width <= Reader::asks(|config: Config| config.width);
//!     height <= Reader::asks(|config: Config| config.height);
//!     let area = width * height;
//!     Reader::pure(area)
//! };
//!
//! assert_eq!(area.run(Config { width: 3, height: 4 }), 12);
//! ```
//!
//! `pattern <= reader; rest` expands to
//! `reader.flat_map(move |pattern| eff!(rest))`.

#![forbid(unsafe_code)]

/// Do-notation for readers. See the [module documentation](self) for the
/// accepted syntax.
#[macro_export]
macro_rules! eff {
    ($result:expr) => {
        $result
    };

    ($pattern:ident <= $reader:expr ; $($rest:tt)+) => {
        $reader.flat_map(move |$pattern| {
            $crate::eff!($($rest)+)
        })
    };

    (($($pattern:tt)*) <= $reader:expr ; $($rest:tt)+) => {
        $reader.flat_map(move |($($pattern)*)| {
            $crate::eff!($($rest)+)
        })
    };

    (_ <= $reader:expr ; $($rest:tt)+) => {
        $reader.flat_map(move |_| {
            $crate::eff!($($rest)+)
        })
    };

    (let $pattern:ident = $expression:expr ; $($rest:tt)+) => {
        {
            let $pattern = $expression;
            $crate::eff!($($rest)+)
        }
    };

    (let ($($pattern:tt)*) = $expression:expr ; $($rest:tt)+) => {
        {
            let ($($pattern)*) = $expression;
            $crate::eff!($($rest)+)
        }
    };
}
