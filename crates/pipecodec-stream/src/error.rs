use std::path::PathBuf;

/// Errors that can occur in byte stream operations.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Failed to open the specified path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to duplicate a caller-supplied handle.
    #[error("failed to duplicate handle: {0}")]
    Duplicate(std::io::Error),

    /// An I/O error occurred on the underlying transport.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport ran dry before the requested bytes were read.
    ///
    /// `available` is the number of bytes that were actually read (and
    /// consumed) before the end was hit. Zero means the stream ended cleanly
    /// exactly at the read boundary.
    #[error("end of file ({available} of {requested} bytes available)")]
    UnexpectedEof { requested: usize, available: usize },

    /// A skip or seek went past the end of a memory-backed stream.
    #[error("cannot move {requested} bytes forward ({available} remaining)")]
    OutOfRange { requested: u64, available: u64 },

    /// The stream has been closed.
    #[error("I/O operation on closed stream")]
    Closed,
}

impl StreamError {
    /// Returns true if the stream ended before any byte of the read was
    /// available.
    pub fn is_clean_eof(&self) -> bool {
        matches!(self, StreamError::UnexpectedEof { available: 0, .. })
    }

    /// Returns true for any end-of-input condition, clean or not.
    pub fn is_eof(&self) -> bool {
        matches!(self, StreamError::UnexpectedEof { .. })
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
