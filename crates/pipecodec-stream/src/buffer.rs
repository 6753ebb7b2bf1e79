use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, StreamError};
use crate::traits::{InStream, OutStream};

/// Input stream over an immutable in-memory buffer.
///
/// Owns a [`Bytes`] by default. [`BufferInStream::borrowed`] reads straight
/// from a caller's slice without copying it.
#[derive(Debug, Clone)]
pub struct BufferInStream<B = Bytes> {
    data: B,
    pos: usize,
    closed: bool,
}

impl BufferInStream {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::from_parts(data.into())
    }
}

impl<'a> BufferInStream<&'a [u8]> {
    /// Read from `data` in place.
    pub fn borrowed(data: &'a [u8]) -> Self {
        Self::from_parts(data)
    }
}

impl<B: AsRef<[u8]>> BufferInStream<B> {
    fn from_parts(data: B) -> Self {
        Self {
            data,
            pos: 0,
            closed: false,
        }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.as_ref().len() - self.pos
    }

    /// Jump to an absolute offset. Offsets past the end are rejected.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.ensure_open()?;
        let len = self.data.as_ref().len() as u64;
        if offset > len {
            return Err(StreamError::OutOfRange {
                requested: offset,
                available: len,
            });
        }
        self.pos = offset as usize;
        Ok(())
    }

    /// The whole underlying buffer, independent of the read position.
    pub fn get_ref(&self) -> &B {
        &self.data
    }

    pub fn into_inner(self) -> B {
        self.data
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(StreamError::Closed)
        } else {
            Ok(())
        }
    }
}

impl<B: AsRef<[u8]>> InStream for BufferInStream<B> {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure_open()?;
        let data = self.data.as_ref();
        let available = data.len() - self.pos;
        if buf.len() > available {
            // Consume what is there so the position matches a real transport.
            buf[..available].copy_from_slice(&data[self.pos..]);
            self.pos = data.len();
            return Err(StreamError::UnexpectedEof {
                requested: buf.len(),
                available,
            });
        }
        let end = self.pos + buf.len();
        buf.copy_from_slice(&data[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        self.ensure_open()?;
        let available = self.remaining() as u64;
        if n > available {
            return Err(StreamError::OutOfRange {
                requested: n,
                available,
            });
        }
        self.pos += n as usize;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Output stream that accumulates into a growable in-memory buffer.
///
/// The accumulated bytes stay readable after [`OutStream::close`].
#[derive(Debug, Default)]
pub struct BufferOutStream {
    buf: BytesMut,
    closed: bool,
}

impl BufferOutStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            closed: false,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Freeze the accumulated bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(StreamError::Closed)
        } else {
            Ok(())
        }
    }
}

impl OutStream for BufferOutStream {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn advance(&mut self, n: u64) -> Result<()> {
        self.ensure_open()?;
        let n = usize::try_from(n).map_err(|_| StreamError::OutOfRange {
            requested: n,
            available: usize::MAX as u64,
        })?;
        self.buf.put_bytes(0, n);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()
    }

    fn position(&self) -> u64 {
        self.buf.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
