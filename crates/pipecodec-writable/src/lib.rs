//! Structured value marshaling on top of the Flow codec.
//!
//! A [`WritableRegistry`] binds each named shape to an ordered list of
//! `(field, tag)` pairs. Writing a value looks up its shape, pulls each field
//! in rule order and encodes the flattened tuple. Reading does the reverse,
//! building a fresh value and assigning the decoded fields.
//!
//! A rule with a single unnamed field marks a *scalar* shape: the value is
//! encoded as itself instead of field by field.

pub mod config;
pub mod error;
pub mod object;
pub mod reader;
pub mod registry;
pub mod rule;
pub mod writer;

pub use config::RegistryConfig;
pub use error::{Result, WritableError};
pub use object::{Object, Readable, Record, Scalar, Writable};
pub use reader::WritableReader;
pub use registry::WritableRegistry;
pub use rule::{FieldRule, WritableRule};
pub use writer::WritableWriter;
