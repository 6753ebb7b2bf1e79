use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, StreamError};

/// A sequential source of bytes.
///
/// Reads are all-or-nothing from the caller's point of view: either the whole
/// buffer is filled or an error is returned. A read that runs into the end of
/// the transport reports how many bytes were available through
/// [`StreamError::UnexpectedEof`], which is how higher layers tell a clean end
/// of stream from a truncated item.
pub trait InStream {
    /// Fill `buf` completely.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Move forward `n` bytes without returning them.
    fn skip(&mut self, n: u64) -> Result<()>;

    /// Number of bytes consumed so far.
    fn position(&self) -> u64;

    /// Release the underlying resource. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Whether [`InStream::close`] has been called.
    fn is_closed(&self) -> bool;
}

/// A sequential sink of bytes.
pub trait OutStream {
    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Move forward `n` bytes without writing data. The gap reads back as zeros.
    fn advance(&mut self, n: u64) -> Result<()>;

    /// Force buffered data out to the transport.
    fn flush(&mut self) -> Result<()>;

    /// Number of bytes produced so far, including advanced gaps.
    fn position(&self) -> u64;

    /// Flush and release the underlying resource. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Whether [`OutStream::close`] has been called.
    fn is_closed(&self) -> bool;
}

impl<S: InStream + ?Sized> InStream for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read(buf)
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        (**self).skip(n)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<S: InStream + ?Sized> InStream for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read(buf)
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        (**self).skip(n)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<S: OutStream + ?Sized> OutStream for &mut S {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn advance(&mut self, n: u64) -> Result<()> {
        (**self).advance(n)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<S: OutStream + ?Sized> OutStream for Box<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn advance(&mut self, n: u64) -> Result<()> {
        (**self).advance(n)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// Fill `buf` from `reader`, retrying interrupted reads.
///
/// On a short read the error carries the number of bytes consumed so that
/// callers can keep their position accurate.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(StreamError::UnexpectedEof {
                    requested: buf.len(),
                    available: filled,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(StreamError::Io(err)),
        }
    }
    Ok(())
}

/// Write all of `data` to `writer`, retrying interrupted writes.
pub(crate) fn write_full<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < data.len() {
        match writer.write(&data[offset..]) {
            Ok(0) => return Err(StreamError::Io(std::io::Error::from(ErrorKind::WriteZero))),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(StreamError::Io(err)),
        }
    }
    Ok(())
}

/// Flush `writer`, retrying interrupted flushes.
pub(crate) fn flush_full<W: Write + ?Sized>(writer: &mut W) -> Result<()> {
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(StreamError::Io(err)),
        }
    }
}
