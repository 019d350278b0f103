//! `argbind` is a schema-driven command line parser.
//!
//! A program declares its options once, as a catalog of
//! [`OptionDescriptor`]s, and `argbind` takes care of the rest: splitting raw
//! arguments into tokens, binding tokens to options, validating the supplied
//! combination, and deserializing every value into a typed [`Value`].
//! Problems never abort the parse; they are collected onto the
//! [`ParserResult`] so the caller can report all of them at once.
//!
//! ```
//! use argbind::{OptionDescriptor, Parser, Schema, Value, ValueType};
//!
//! let schema = Schema::new(vec![
//!     OptionDescriptor::new("verbose", ValueType::Boolean).short('v'),
//!     OptionDescriptor::new("count", ValueType::Unsigned).default_value(Value::Uint(1)),
//!     OptionDescriptor::new("input", ValueType::String).position(0).required(),
//! ])
//! .unwrap();
//! let parser = Parser::default();
//!
//! let result = parser.parse(&schema, &["data.csv", "-v", "--count=3"]);
//!
//! assert!(result.is_ok());
//! assert_eq!(result.value("input"), Some(&Value::Str("data.csv".to_string())));
//! assert_eq!(result.value("verbose"), Some(&Value::Bool(true)));
//! assert_eq!(result.value("count"), Some(&Value::Uint(3)));
//! ```
//!
//! Options may be addressed by long name (`--count 5` or `--count=5`), by
//! short name (`-c 5`, with `-vc` standing for `-v -c`), or positionally for
//! descriptors declaring a position.  Multi-value options (the collection
//! [`ValueType`]s) capture values greedily until the next option token.
//!
//! Programs with sub-commands route through a [`VerbRouter`], which selects a
//! schema from the first argument:
//!
//! ```
//! use argbind::{Error, OptionDescriptor, Parser, Schema, ValueType, VerbRouter};
//!
//! let router = VerbRouter::default()
//!     .verb(
//!         "add",
//!         Schema::new(vec![OptionDescriptor::new("item", ValueType::String).position(0)])
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let result = router.parse(&Parser::default(), &[]);
//!
//! assert_eq!(result.errors(), &[Error::NoVerbSelected]);
//! ```
#![deny(missing_docs)]

mod aggregate;
mod binder;
mod errors;
mod model;
mod parser;
mod schema;
mod tokens;
mod value;
mod verbs;

pub use aggregate::ParserResult;
pub use errors::{Error, SetConflict};
pub use model::{Arity, OptionDescriptor, OptionName, Validator};
pub use parser::{ConfigError, Parser, ParserSettings};
pub use schema::{Schema, SchemaError};
pub use value::{ParseLocale, Value, ValueType};
pub use verbs::VerbRouter;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
