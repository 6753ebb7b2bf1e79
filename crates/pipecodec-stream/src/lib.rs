//! Byte streams for the Hadoop Pipes codec.
//!
//! Provides a unified interface over the transports a Pipes peer talks through:
//! - Files and file descriptors (pipes, sockets, regular files)
//! - In-memory buffers
//! - Any `std::io::Read` / `std::io::Write`
//!
//! This is the lowest layer of pipecodec. Everything else builds on top of
//! the [`InStream`] and [`OutStream`] traits provided here.

pub mod buffer;
pub mod error;
pub mod file;
pub mod io;
pub mod traits;

pub use buffer::{BufferInStream, BufferOutStream};
pub use error::{Result, StreamError};
pub use file::{FileInStream, FileOutStream};
pub use io::{ReaderInStream, WriterOutStream};
pub use traits::{InStream, OutStream};
