use std::io::{Read, Write};

use crate::error::{Result, StreamError};
use crate::traits::{flush_full, read_full, write_full, InStream, OutStream};

const ZERO_CHUNK: [u8; 4096] = [0u8; 4096];

/// Input stream over any [`Read`] implementation.
///
/// No buffering is added; wrap the reader in a `BufReader` if it issues
/// expensive system calls.
#[derive(Debug)]
pub struct ReaderInStream<R> {
    inner: Option<R>,
    position: u64,
}

impl<R: Read> ReaderInStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: Some(reader),
            position: 0,
        }
    }

    /// Returns `None` once the stream is closed.
    pub fn get_ref(&self) -> Option<&R> {
        self.inner.as_ref()
    }

    /// Returns `None` once the stream is closed.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}

impl<R: Read> InStream for ReaderInStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let reader = self.inner.as_mut().ok_or(StreamError::Closed)?;
        let result = read_full(reader, buf);
        match &result {
            Ok(()) => self.position += buf.len() as u64,
            Err(StreamError::UnexpectedEof { available, .. }) => self.position += *available as u64,
            Err(_) => {}
        }
        result
    }

    /// Skips by reading and discarding, so it works on any transport.
    fn skip(&mut self, n: u64) -> Result<()> {
        let reader = self.inner.as_mut().ok_or(StreamError::Closed)?;
        let skipped = std::io::copy(&mut reader.by_ref().take(n), &mut std::io::sink())?;
        self.position += skipped;
        if skipped < n {
            return Err(StreamError::OutOfRange {
                requested: n,
                available: skipped,
            });
        }
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> Result<()> {
        self.inner = None;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

/// Output stream over any [`Write`] implementation.
#[derive(Debug)]
pub struct WriterOutStream<W: Write> {
    inner: Option<W>,
    position: u64,
}

impl<W: Write> WriterOutStream<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Some(writer),
            position: 0,
        }
    }

    /// Returns `None` once the stream is closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    /// Flush and hand back the writer. Returns `None` if already closed.
    pub fn into_inner(mut self) -> Result<Option<W>> {
        if let Some(writer) = self.inner.as_mut() {
            flush_full(writer)?;
        }
        Ok(self.inner.take())
    }
}

impl<W: Write> OutStream for WriterOutStream<W> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let writer = self.inner.as_mut().ok_or(StreamError::Closed)?;
        write_full(writer, data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    /// Writes explicit zeros; plain writers cannot seek.
    fn advance(&mut self, n: u64) -> Result<()> {
        let writer = self.inner.as_mut().ok_or(StreamError::Closed)?;
        let mut left = n;
        while left > 0 {
            let chunk = left.min(ZERO_CHUNK.len() as u64) as usize;
            write_full(writer, &ZERO_CHUNK[..chunk])?;
            self.position += chunk as u64;
            left -= chunk as u64;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        flush_full(self.inner.as_mut().ok_or(StreamError::Closed)?)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(mut writer) => flush_full(&mut writer),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}
