use pipecodec_stream::StreamError;

use crate::rule::TypeTag;

/// Errors that can occur while encoding or decoding typed items.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The underlying byte stream failed (including use after close).
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// The stream ended cleanly where an item or tuple was about to start.
    #[error("end of stream")]
    EndOfStream,

    /// The stream ended in the middle of an item or tuple.
    #[error("truncated {what}: stream ended mid-item")]
    Truncated { what: &'static str },

    /// A rule contained a character that is not a known tag.
    #[error("unknown type tag {0:?}")]
    UnknownTag(char),

    /// A tuple had a different number of values than its rule.
    #[error("arity mismatch (rule has {expected} items, got {found})")]
    Arity { expected: usize, found: usize },

    /// A decoded string length or array count was negative.
    #[error("negative {what} length on the wire: {length}")]
    NegativeLength { what: &'static str, length: i64 },

    /// A decoded string length or array count exceeded the configured limit.
    #[error("{what} length {length} exceeds limit {max}")]
    LengthLimit {
        what: &'static str,
        length: usize,
        max: usize,
    },

    /// A nullable string carried a marker byte other than present/null.
    #[error("invalid nullable marker byte 0x{0:02x}")]
    BadMarker(u8),

    /// An integer does not fit the 32-bit `i` item.
    #[error("value {0} does not fit in a 32-bit integer")]
    Overflow(i64),

    /// A value's kind cannot be encoded under the given tag.
    #[error("cannot encode {found} as '{tag}'")]
    TypeMismatch { tag: TypeTag, found: &'static str },

    /// Decoded bytes were expected to be UTF-8 text.
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl FlowError {
    /// Returns true for a clean end of stream at an item boundary.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, FlowError::EndOfStream)
    }

    /// Returns true if the peer sent (or the caller built) malformed framing.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            FlowError::Truncated { .. }
                | FlowError::UnknownTag(_)
                | FlowError::Arity { .. }
                | FlowError::NegativeLength { .. }
                | FlowError::LengthLimit { .. }
                | FlowError::BadMarker(_)
        )
    }

    /// Returns true if a value could not be represented under its tag.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            FlowError::Overflow(_) | FlowError::TypeMismatch { .. } | FlowError::InvalidUtf8(_)
        )
    }

    /// Returns true if the underlying transport failed.
    pub fn is_io(&self) -> bool {
        matches!(self, FlowError::Stream(_))
    }

    /// Turn a clean end of stream into a truncation of `what`.
    ///
    /// Used once a frame has started: running out of input after that point
    /// means the frame was cut, not that the stream ended between frames.
    pub fn mid_frame(self, what: &'static str) -> Self {
        match self {
            FlowError::EndOfStream => FlowError::Truncated { what },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_disjoint() {
        let errors = [
            FlowError::EndOfStream,
            FlowError::Truncated { what: "int" },
            FlowError::BadMarker(7),
            FlowError::Overflow(1 << 40),
            FlowError::Stream(StreamError::Closed),
        ];
        for err in &errors {
            let flags = [
                err.is_end_of_stream(),
                err.is_protocol(),
                err.is_value(),
                err.is_io(),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{err:?}");
        }
    }

    #[test]
    fn mid_frame_only_rewrites_end_of_stream() {
        assert!(matches!(
            FlowError::EndOfStream.mid_frame("tuple"),
            FlowError::Truncated { what: "tuple" }
        ));
        assert!(matches!(
            FlowError::BadMarker(2).mid_frame("tuple"),
            FlowError::BadMarker(2)
        ));
    }

    #[test]
    fn messages_name_the_problem() {
        let err = FlowError::TypeMismatch {
            tag: TypeTag::Int,
            found: "bytes",
        };
        assert_eq!(err.to_string(), "cannot encode bytes as 'i'");
        assert_eq!(
            FlowError::BadMarker(0x7f).to_string(),
            "invalid nullable marker byte 0x7f"
        );
    }
}
