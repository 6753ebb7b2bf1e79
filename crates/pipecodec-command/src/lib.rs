//! Command-level framing for the Hadoop Pipes protocol.
//!
//! Every message on the wire is an `i` command code immediately followed by
//! the tuple described by that command's rule. The [`CommandTable`] maps
//! codes to names and rules; [`CommandReader`] and [`CommandWriter`] move
//! whole commands over a byte stream.

#[cfg(feature = "async")]
pub mod codec;
pub mod codes;
pub mod command;
pub mod error;
pub mod reader;
pub mod table;
pub mod writer;

#[cfg(feature = "async")]
pub use codec::CommandCodec;
pub use command::Command;
pub use error::{CommandError, Result};
pub use reader::CommandReader;
pub use table::{CommandSpec, CommandTable};
pub use writer::CommandWriter;
