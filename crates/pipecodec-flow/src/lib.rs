//! Typed primitive encoding for the Hadoop Pipes wire format.
//!
//! A rule is a string of single-character tags, each naming one item shape:
//! - `i` 32-bit integer and `L` 64-bit integer, both as Hadoop VInt/VLong
//! - `f` 32-bit big-endian IEEE-754 float
//! - `s` byte string, `S` nullable byte string, `A` array of byte strings
//!
//! [`FlowReader`] and [`FlowWriter`] apply rules to an
//! [`InStream`](pipecodec_stream::InStream) or
//! [`OutStream`](pipecodec_stream::OutStream).

pub mod codec;
pub mod config;
pub mod error;
pub mod reader;
pub mod rule;
pub mod split;
pub mod value;
pub mod vint;
pub mod writer;

pub use codec::{
    check_item, check_tuple, decode_item, decode_tuple, encode_bytes, encode_item, encode_tuple,
};
pub use config::{FlowConfig, DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_STRING_LEN};
pub use error::{FlowError, Result};
pub use reader::FlowReader;
pub use rule::{Rule, TypeTag};
pub use split::FileSplit;
pub use value::Value;
pub use writer::FlowWriter;
