//! Hadoop Pipes binary protocol codec.
//!
//! pipecodec reads and writes the byte streams exchanged between a Hadoop
//! task tracker and an external Pipes worker: variable-length integers,
//! length-prefixed strings, typed command frames and registry-driven
//! structured values.
//!
//! # Crate Structure
//!
//! - [`stream`]: positioned byte streams over files, buffers and any `Read`/`Write`
//! - [`flow`]: primitive codec driven by type-tag rules (`i`, `L`, `f`, `s`, `S`, `A`)
//! - [`command`]: command tables and command-frame readers/writers
//! - [`writable`]: shape registry and structured value marshaling (behind `writable` feature)

/// Re-export stream types.
pub mod stream {
    pub use pipecodec_stream::*;
}

/// Re-export flow types.
pub mod flow {
    pub use pipecodec_flow::*;
}

/// Re-export command types.
pub mod command {
    pub use pipecodec_command::*;
}

/// Re-export writable types (requires `writable` feature).
#[cfg(feature = "writable")]
pub mod writable {
    pub use pipecodec_writable::*;
}
