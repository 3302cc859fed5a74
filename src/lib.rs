//! larch — a fast Python parser producing CPython-shaped syntax trees.
//!
//! The library surface is small: [`parse`] turns a source string into an
//! [`ast::Module`] or a structured [`ParseError`].  The tree borrows
//! identifier and number slices from the input (`Module<'src>`), so the
//! source must outlive it.
//!
//! ```
//! let module = larch::parse("x = 1\n").unwrap();
//! assert_eq!(module.body.len(), 1);
//! ```

pub mod ast;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod location;
pub mod parser;

pub use error::{ErrorKind, ParseError, ParseResult};
pub use parser::parse;
