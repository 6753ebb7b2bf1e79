use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, StreamError};
use crate::traits::{flush_full, read_full, write_full, InStream, OutStream};

const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// File-descriptor-backed input stream.
///
/// Owns exactly one OS handle: either a file it opened itself or a duplicate
/// of a handle supplied by the caller. The caller's handle is never shared,
/// so its offset is not raced.
pub struct FileInStream {
    inner: Option<BufReader<File>>,
    position: u64,
}

impl FileInStream {
    /// Open a file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StreamError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "opened input stream");
        Ok(Self::from_file(file))
    }

    /// Take ownership of an already open file.
    pub fn from_file(file: File) -> Self {
        Self {
            inner: Some(BufReader::with_capacity(DEFAULT_BUFFER_CAPACITY, file)),
            position: 0,
        }
    }

    /// Read from a duplicate of `file`; the caller keeps its own handle.
    pub fn duplicate(file: &File) -> Result<Self> {
        let dup = file.try_clone().map_err(StreamError::Duplicate)?;
        Ok(Self::from_file(dup))
    }

    /// Read from a duplicate of any file descriptor (pipe, socket, file).
    #[cfg(unix)]
    pub fn from_fd(fd: impl std::os::fd::AsFd) -> Result<Self> {
        let owned = fd
            .as_fd()
            .try_clone_to_owned()
            .map_err(StreamError::Duplicate)?;
        Ok(Self::from_file(File::from(owned)))
    }

    fn reader(&mut self) -> Result<&mut BufReader<File>> {
        self.inner.as_mut().ok_or(StreamError::Closed)
    }
}

impl InStream for FileInStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let reader = self.reader()?;
        let result = read_full(reader, buf);
        match &result {
            Ok(()) => self.position += buf.len() as u64,
            Err(StreamError::UnexpectedEof { available, .. }) => self.position += *available as u64,
            Err(_) => {}
        }
        result
    }

    /// Seeks forward. Fails on transports that cannot seek (pipes, sockets).
    ///
    /// On regular files a skip past the end is rejected before seeking and
    /// leaves the position unchanged.
    fn skip(&mut self, n: u64) -> Result<()> {
        let offset = i64::try_from(n).map_err(|_| StreamError::OutOfRange {
            requested: n,
            available: i64::MAX as u64,
        })?;
        let reader = self.reader()?;
        let metadata = reader.get_ref().metadata()?;
        if metadata.is_file() {
            let available = metadata.len().saturating_sub(reader.stream_position()?);
            if n > available {
                return Err(StreamError::OutOfRange {
                    requested: n,
                    available,
                });
            }
        }
        reader.seek_relative(offset)?;
        self.position += n;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> Result<()> {
        if self.inner.take().is_some() {
            debug!(position = self.position, "closed input stream");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl std::fmt::Debug for FileInStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileInStream")
            .field("position", &self.position)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// File-descriptor-backed output stream with an internal write buffer.
pub struct FileOutStream {
    inner: Option<BufWriter<File>>,
    position: u64,
}

impl FileOutStream {
    /// Create (or truncate) a file for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, true)
    }

    /// Open a file for writing. With `overwrite == false` an existing file is
    /// an error.
    pub fn open_with(path: impl AsRef<Path>, overwrite: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let file = options.open(path).map_err(|source| StreamError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, overwrite, "opened output stream");
        Ok(Self::from_file(file))
    }

    /// Take ownership of an already open file.
    pub fn from_file(file: File) -> Self {
        Self {
            inner: Some(BufWriter::with_capacity(DEFAULT_BUFFER_CAPACITY, file)),
            position: 0,
        }
    }

    /// Write to a duplicate of `file`; the caller keeps its own handle.
    pub fn duplicate(file: &File) -> Result<Self> {
        let dup = file.try_clone().map_err(StreamError::Duplicate)?;
        Ok(Self::from_file(dup))
    }

    /// Write to a duplicate of any file descriptor (pipe, socket, file).
    #[cfg(unix)]
    pub fn from_fd(fd: impl std::os::fd::AsFd) -> Result<Self> {
        let owned = fd
            .as_fd()
            .try_clone_to_owned()
            .map_err(StreamError::Duplicate)?;
        Ok(Self::from_file(File::from(owned)))
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        self.inner.as_mut().ok_or(StreamError::Closed)
    }
}

impl OutStream for FileOutStream {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        write_full(self.writer()?, data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    /// Seeks forward; the file is zero-filled once something is written past
    /// the gap. Fails on transports that cannot seek.
    fn advance(&mut self, n: u64) -> Result<()> {
        let offset = i64::try_from(n).map_err(|_| StreamError::OutOfRange {
            requested: n,
            available: i64::MAX as u64,
        })?;
        // BufWriter flushes pending data before seeking.
        self.writer()?.seek(SeekFrom::Current(offset))?;
        self.position += n;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        flush_full(self.writer()?)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> Result<()> {
        let Some(writer) = self.inner.take() else {
            return Ok(());
        };
        // The handle is released even when the final flush fails.
        let file = writer.into_inner().map_err(|err| err.into_error())?;
        drop(file);
        debug!(position = self.position, "closed output stream");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl Drop for FileOutStream {
    fn drop(&mut self) {
        if let Some(writer) = self.inner.as_mut() {
            if let Err(err) = flush_full(writer) {
                debug!(%err, "flush on drop failed");
            }
        }
    }
}

impl std::fmt::Debug for FileOutStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileOutStream")
            .field("position", &self.position)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pipecodec-stream-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn write_then_read_file() {
        let dir = temp_dir("rw");
        let path = dir.join("data.bin");

        let mut out = FileOutStream::create(&path).unwrap();
        out.write(b"abcdefgh").unwrap();
        assert_eq!(out.position(), 8);
        out.close().unwrap();

        let mut input = FileInStream::open(&path).unwrap();
        let mut buf = [0u8; 3];
        input.read(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");
        input.skip(2).unwrap();
        input.read(&mut buf).unwrap();
        assert_eq!(&buf, b"fgh");
        assert_eq!(input.position(), 8);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn skip_past_end_of_file_is_rejected() {
        let dir = temp_dir("skip-end");
        let path = dir.join("short.bin");
        std::fs::write(&path, b"abc").unwrap();

        let mut input = FileInStream::open(&path).unwrap();
        let mut buf = [0u8; 1];
        input.read(&mut buf).unwrap();

        let err = input.skip(100).unwrap_err();
        assert!(matches!(
            err,
            StreamError::OutOfRange {
                requested: 100,
                available: 2
            }
        ));
        assert_eq!(input.position(), 1);

        input.skip(2).unwrap();
        assert_eq!(input.position(), 3);
        assert!(input.read(&mut buf).unwrap_err().is_clean_eof());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn advance_leaves_zero_filled_gap() {
        let dir = temp_dir("advance");
        let path = dir.join("gap.bin");

        let mut out = FileOutStream::create(&path).unwrap();
        out.write(b"abcdefgh").unwrap();
        out.flush().unwrap();
        out.advance(10).unwrap();
        out.write(b"abcdefgh").unwrap();
        assert_eq!(out.position(), 26);
        out.close().unwrap();

        let mut expected = b"abcdefgh".to_vec();
        expected.extend_from_slice(&[0u8; 10]);
        expected.extend_from_slice(b"abcdefgh");
        assert_eq!(std::fs::read(&path).unwrap(), expected);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_missing_file_fails_with_path() {
        let err = FileInStream::open("/definitely/not/here.bin").unwrap_err();
        assert!(matches!(err, StreamError::Open { .. }));
        assert!(err.to_string().contains("/definitely/not/here.bin"));
    }

    #[test]
    fn create_in_missing_dir_fails() {
        let dir = temp_dir("missing");
        let err = FileOutStream::create(dir.join("nope").join("foo")).unwrap_err();
        assert!(matches!(err, StreamError::Open { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn create_new_refuses_existing_file() {
        let dir = temp_dir("create-new");
        let path = dir.join("exists.bin");
        std::fs::write(&path, b"x").unwrap();

        let err = FileOutStream::open_with(&path, false).unwrap_err();
        assert!(matches!(err, StreamError::Open { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_past_end_reports_eof() {
        let dir = temp_dir("eof");
        let path = dir.join("short.bin");
        std::fs::write(&path, b"abc").unwrap();

        let mut input = FileInStream::open(&path).unwrap();
        input.skip(3).unwrap();
        let mut buf = [0u8; 1];
        let err = input.read(&mut buf).unwrap_err();
        assert!(err.is_clean_eof());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn closed_stream_rejects_operations_and_close_is_idempotent() {
        let dir = temp_dir("closed");
        let path = dir.join("c.bin");

        let mut out = FileOutStream::create(&path).unwrap();
        out.close().unwrap();
        out.close().unwrap();
        assert!(out.is_closed());
        assert!(matches!(out.write(b"x"), Err(StreamError::Closed)));
        assert!(matches!(out.flush(), Err(StreamError::Closed)));

        let mut input = FileInStream::open(&path).unwrap();
        input.close().unwrap();
        input.close().unwrap();
        let mut buf = [0u8; 1];
        assert!(matches!(input.read(&mut buf), Err(StreamError::Closed)));
        assert!(matches!(input.skip(1), Err(StreamError::Closed)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn duplicate_does_not_share_caller_handle() {
        let dir = temp_dir("dup");
        let path = dir.join("d.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let file = File::open(&path).unwrap();
        let mut input = FileInStream::duplicate(&file).unwrap();
        input.close().unwrap();

        // The caller's handle stays usable after the stream is closed.
        let mut original = file;
        let mut content = String::new();
        std::io::Read::read_to_string(&mut original, &mut content).unwrap();
        assert_eq!(content, "0123456789");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn skip_on_pipe_fails() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut input = FileInStream::from_fd(&right).unwrap();
        drop(left);
        assert!(matches!(input.skip(4), Err(StreamError::Io(_))));
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_socket_pair() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut out = FileOutStream::from_fd(&left).unwrap();
        let mut input = FileInStream::from_fd(&right).unwrap();

        out.write(b"ping").unwrap();
        out.flush().unwrap();

        let mut buf = [0u8; 4];
        input.read(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[test]
    #[cfg(unix)]
    fn peer_close_unblocks_reader_with_eof() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut input = FileInStream::from_fd(&right).unwrap();
        drop(right);

        let reader = std::thread::spawn(move || {
            let mut buf = [0u8; 8];
            input.read(&mut buf)
        });
        std::thread::sleep(std::time::Duration::from_millis(20));
        drop(left);

        let err = reader.join().unwrap().unwrap_err();
        assert!(err.is_clean_eof());
    }
}
