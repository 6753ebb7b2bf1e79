use bytes::Bytes;
use pipecodec_stream::InStream;

use crate::codec::{self, decode_item, decode_tuple};
use crate::config::FlowConfig;
use crate::error::{FlowError, Result};
use crate::rule::{Rule, TypeTag};
use crate::value::Value;

/// Reads typed items and tuples from an [`InStream`].
pub struct FlowReader<S> {
    inner: S,
    config: FlowConfig,
}

impl<S: InStream> FlowReader<S> {
    /// Create a new reader with default limits.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, FlowConfig::default())
    }

    /// Create a new reader with explicit limits.
    pub fn with_config(inner: S, config: FlowConfig) -> Self {
        Self { inner, config }
    }

    /// Read one tuple described by `rule`.
    pub fn read(&mut self, rule: &Rule) -> Result<Vec<Value>> {
        decode_tuple(rule, &mut self.inner, &self.config)
    }

    /// Read one item.
    pub fn read_item(&mut self, tag: TypeTag) -> Result<Value> {
        decode_item(tag, &mut self.inner, &self.config)
    }

    /// Read an `i` item.
    pub fn read_int(&mut self) -> Result<i32> {
        self.read_vint()
    }

    /// Read a VInt, failing with an overflow if it does not fit in 32 bits.
    pub fn read_vint(&mut self) -> Result<i32> {
        let v = self.read_vlong()?;
        i32::try_from(v).map_err(|_| FlowError::Overflow(v))
    }

    pub fn read_vlong(&mut self) -> Result<i64> {
        codec::read_vlong(&mut self.inner, true, TypeTag::Long.name())
    }

    pub fn read_float(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        codec::read_exact(&mut self.inner, &mut buf, true, TypeTag::Float.name())?;
        Ok(f32::from_be_bytes(buf))
    }

    /// Read an `s` item as raw bytes.
    pub fn read_bytes(&mut self) -> Result<Bytes> {
        codec::read_string(&mut self.inner, true, &self.config)
    }

    /// Read an `s` item that must hold UTF-8 text.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        let text = std::str::from_utf8(&bytes)?;
        Ok(text.to_owned())
    }

    /// Read a Hadoop `LongWritable`: 8 bytes, big-endian.
    pub fn read_long_writable(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        codec::read_exact(&mut self.inner, &mut buf, true, "long writable")?;
        Ok(i64::from_be_bytes(buf))
    }

    /// Skip `n` raw bytes.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.inner.skip(n).map_err(FlowError::from)
    }

    /// Bytes consumed from the underlying stream so far.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Close the underlying stream.
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

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Current decoding limits.
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Replace decoding limits for subsequent reads.
    pub fn set_config(&mut self, config: FlowConfig) {
        self.config = config;
    }
}

impl<S> std::fmt::Debug for FlowReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowReader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pipecodec_stream::{BufferInStream, BufferOutStream, StreamError};

    use super::*;
    use crate::writer::FlowWriter;

    fn wire(build: impl FnOnce(&mut FlowWriter<BufferOutStream>)) -> BufferInStream {
        let mut writer = FlowWriter::new(BufferOutStream::new());
        build(&mut writer);
        BufferInStream::new(writer.into_inner().into_bytes())
    }

    #[test]
    fn read_rule_tuple() {
        let rule = Rule::parse("sLf").unwrap();
        let input = wire(|w| {
            w.write(&rule, &[Value::from("a"), Value::Long(-7), Value::Float(0.25)])
                .unwrap()
        });
        let mut reader = FlowReader::new(input);
        let values = reader.read(&rule).unwrap();
        assert_eq!(
            values,
            vec![Value::from("a"), Value::Long(-7), Value::Float(0.25)]
        );
        assert!(reader.read(&rule).unwrap_err().is_end_of_stream());
    }

    #[test]
    fn raw_helpers() {
        let input = wire(|w| {
            w.write_vint(-113).unwrap();
            w.write_vlong(1 << 50).unwrap();
            w.write_float(-2.0).unwrap();
            w.write_string("héllo").unwrap();
            w.write_bytes(&[0xde, 0xad]).unwrap();
            w.write_long_writable(-2).unwrap();
        });
        let mut reader = FlowReader::new(input);
        assert_eq!(reader.read_int().unwrap(), -113);
        assert_eq!(reader.read_vlong().unwrap(), 1 << 50);
        assert_eq!(reader.read_float().unwrap(), -2.0);
        assert_eq!(reader.read_string().unwrap(), "héllo");
        assert_eq!(reader.read_bytes().unwrap().as_ref(), &[0xde, 0xad]);
        assert_eq!(reader.read_long_writable().unwrap(), -2);
    }

    #[test]
    fn long_writable_is_fixed_width_big_endian() {
        let mut reader = FlowReader::new(BufferInStream::new(&[0, 0, 0, 0, 0, 0, 1, 0][..]));
        assert_eq!(reader.read_long_writable().unwrap(), 256);
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn read_vint_rejects_wide_values() {
        let input = wire(|w| w.write_vlong(1 << 40).unwrap());
        let mut reader = FlowReader::new(input);
        assert!(matches!(reader.read_vint(), Err(FlowError::Overflow(_))));
    }

    #[test]
    fn read_string_rejects_invalid_utf8() {
        let input = wire(|w| w.write_bytes(&[0xff, 0xfe]).unwrap());
        let mut reader = FlowReader::new(input);
        assert!(matches!(reader.read_string(), Err(FlowError::InvalidUtf8(_))));
    }

    #[test]
    fn config_limits_apply() {
        let input = wire(|w| w.write_string("too long").unwrap());
        let mut reader = FlowReader::with_config(
            input,
            FlowConfig {
                max_string_len: 3,
                ..FlowConfig::default()
            },
        );
        assert!(matches!(
            reader.read_bytes(),
            Err(FlowError::LengthLimit { .. })
        ));
    }

    #[test]
    fn close_makes_reads_fail() {
        let input = wire(|w| w.write_int(1).unwrap());
        let mut reader = FlowReader::new(input);
        reader.close().unwrap();
        reader.close().unwrap();
        assert!(matches!(
            reader.read_int(),
            Err(FlowError::Stream(StreamError::Closed))
        ));
    }
}
