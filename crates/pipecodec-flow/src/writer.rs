use bytes::{BufMut, BytesMut};
use pipecodec_stream::OutStream;

use crate::codec::{encode_bytes, encode_item, encode_tuple};
use crate::error::{FlowError, Result};
use crate::rule::{Rule, TypeTag};
use crate::value::Value;
use crate::vint::put_vlong;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes typed items and tuples to an [`OutStream`].
///
/// Each call is encoded into an internal scratch buffer first and handed to
/// the stream in one write, so a rejected value never leaves a partial item
/// behind.
pub struct FlowWriter<S> {
    inner: S,
    buf: BytesMut,
}

impl<S: OutStream> FlowWriter<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Write one tuple described by `rule`.
    pub fn write(&mut self, rule: &Rule, values: &[Value]) -> Result<()> {
        self.buf.clear();
        encode_tuple(rule, values, &mut self.buf)?;
        self.emit()
    }

    /// Write one item.
    pub fn write_item(&mut self, tag: TypeTag, value: &Value) -> Result<()> {
        self.buf.clear();
        encode_item(tag, value, &mut self.buf)?;
        self.emit()
    }

    /// Write an `i` item.
    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.write_vint(value)
    }

    pub fn write_vint(&mut self, value: i32) -> Result<()> {
        self.write_vlong(i64::from(value))
    }

    pub fn write_vlong(&mut self, value: i64) -> Result<()> {
        self.buf.clear();
        put_vlong(&mut self.buf, value);
        self.emit()
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.buf.clear();
        self.buf.put_f32(value);
        self.emit()
    }

    /// Write raw bytes as an `s` item.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_bytes(bytes, &mut self.buf)?;
        self.emit()
    }

    /// Write UTF-8 text as an `s` item.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Write a Hadoop `LongWritable`: 8 bytes, big-endian.
    pub fn write_long_writable(&mut self, value: i64) -> Result<()> {
        self.inner.write(&value.to_be_bytes())?;
        Ok(())
    }

    /// Write already-encoded bytes verbatim.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write(bytes)?;
        Ok(())
    }

    /// Leave an `n`-byte zero gap.
    pub fn advance(&mut self, n: u64) -> Result<()> {
        self.inner.advance(n).map_err(FlowError::from)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(FlowError::from)
    }

    /// Bytes produced on the underlying stream so far.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Flush and close the underlying stream.
    pub fn close(&mut self) -> Result<()> {
        self.inner.close().map_err(FlowError::from)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn emit(&mut self) -> Result<()> {
        self.inner.write(&self.buf)?;
        Ok(())
    }
}

impl<S> std::fmt::Debug for FlowWriter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowWriter")
            .field("buffered", &self.buf.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use pipecodec_stream::{BufferOutStream, StreamError};

    use super::*;

    #[test]
    fn write_tuple_bytes() {
        let mut writer = FlowWriter::new(BufferOutStream::new());
        let rule = Rule::parse("ss").unwrap();
        writer
            .write(&rule, &[Value::from("k1"), Value::from("v1")])
            .unwrap();
        assert_eq!(
            writer.get_ref().as_slice(),
            &[0x02, b'k', b'1', 0x02, b'v', b'1']
        );
    }

    #[test]
    fn rejected_tuple_leaves_position_unchanged() {
        let mut writer = FlowWriter::new(BufferOutStream::new());
        writer.write_int(5).unwrap();
        let before = writer.position();

        let rule = Rule::parse("iA").unwrap();
        let err = writer
            .write(&rule, &[Value::Int(1), Value::from("not an array")])
            .unwrap_err();
        assert!(err.is_value());
        assert_eq!(writer.position(), before);

        let err = writer.write(&rule, &[Value::Int(1)]).unwrap_err();
        assert!(err.is_protocol());
        assert_eq!(writer.position(), before);
    }

    #[test]
    fn write_item_and_array() {
        let mut writer = FlowWriter::new(BufferOutStream::new());
        writer
            .write_item(
                TypeTag::Array,
                &Value::Array(vec![Bytes::from_static(b"x")]),
            )
            .unwrap();
        assert_eq!(writer.get_ref().as_slice(), &[0x01, 0x01, b'x']);
    }

    #[test]
    fn long_writable_layout() {
        let mut writer = FlowWriter::new(BufferOutStream::new());
        writer.write_long_writable(258).unwrap();
        assert_eq!(writer.get_ref().as_slice(), &[0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn advance_then_write() {
        let mut writer = FlowWriter::new(BufferOutStream::new());
        writer.write_raw(b"ab").unwrap();
        writer.advance(2).unwrap();
        writer.write_raw(b"c").unwrap();
        assert_eq!(writer.get_ref().as_slice(), &[b'a', b'b', 0, 0, b'c']);
    }

    #[test]
    fn closed_writer_fails() {
        let mut writer = FlowWriter::new(BufferOutStream::new());
        writer.close().unwrap();
        assert!(matches!(
            writer.write_int(1),
            Err(FlowError::Stream(StreamError::Closed))
        ));
    }
}
