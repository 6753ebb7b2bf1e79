use bytes::{Bytes, BytesMut};
use pipecodec_stream::{BufferInStream, BufferOutStream};

use crate::error::{FlowError, Result};
use crate::reader::FlowReader;
use crate::writer::FlowWriter;

/// A serialized Hadoop `FileSplit`: the input file of a map task and the byte
/// range within it.
///
/// The host sends it as the opaque first argument of `RUN_MAP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSplit {
    pub filename: String,
    pub offset: i64,
    pub length: i64,
}

impl FileSplit {
    /// Decode from the raw bytes of a `RUN_MAP` split argument.
    ///
    /// Layout: `s` filename (UTF-8), then offset and length as `LongWritable`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = FlowReader::new(BufferInStream::new(Bytes::copy_from_slice(bytes)));
        let truncated = |err: FlowError| err.mid_frame("file split");
        let filename = reader.read_string().map_err(truncated)?;
        let offset = reader.read_long_writable().map_err(truncated)?;
        let length = reader.read_long_writable().map_err(truncated)?;
        let consumed = reader.position();
        let total = reader.get_ref().get_ref().len() as u64;
        if consumed != total {
            tracing::warn!(trailing = total - consumed, "file split has trailing bytes");
        }
        Ok(Self {
            filename,
            offset,
            length,
        })
    }

    /// Encode into the layout accepted by [`FileSplit::decode`].
    pub fn encode(&self) -> Result<Bytes> {
        let mut writer = FlowWriter::new(BufferOutStream::with_capacity(self.filename.len() + 17));
        writer.write_string(&self.filename)?;
        writer.write_long_writable(self.offset)?;
        writer.write_long_writable(self.length)?;
        Ok(writer.into_inner().into_bytes())
    }
}

impl TryFrom<&Bytes> for FileSplit {
    type Error = FlowError;

    fn try_from(bytes: &Bytes) -> Result<Self> {
        FileSplit::decode(bytes)
    }
}

impl TryFrom<&BytesMut> for FileSplit {
    type Error = FlowError;

    fn try_from(bytes: &BytesMut) -> Result<Self> {
        FileSplit::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_known_layout() {
        let mut raw = vec![0x08];
        raw.extend_from_slice(b"/in/part");
        raw.extend_from_slice(&100i64.to_be_bytes());
        raw.extend_from_slice(&4096i64.to_be_bytes());

        let split = FileSplit::decode(&raw).unwrap();
        assert_eq!(
            split,
            FileSplit {
                filename: "/in/part".to_string(),
                offset: 100,
                length: 4096,
            }
        );
        assert_eq!(split.encode().unwrap().as_ref(), raw.as_slice());
    }

    #[test]
    fn truncated_split_is_an_error() {
        let split = FileSplit {
            filename: "f".to_string(),
            offset: 1,
            length: 2,
        };
        let bytes = split.encode().unwrap();
        let err = FileSplit::decode(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, FlowError::Truncated { .. }));

        // Nothing after the filename at all.
        let err = FileSplit::decode(&bytes[..2]).unwrap_err();
        assert!(matches!(err, FlowError::Truncated { what: "file split" }));
    }

    #[test]
    fn empty_input_is_truncated() {
        let err = FileSplit::decode(&[]).unwrap_err();
        assert!(matches!(err, FlowError::Truncated { what: "file split" }));
    }
}
