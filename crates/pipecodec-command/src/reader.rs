use std::iter::FusedIterator;

use pipecodec_flow::{FlowConfig, FlowReader};
use pipecodec_stream::InStream;
use tracing::{debug, trace};

use crate::command::{decode_command, Command};
use crate::error::Result;
use crate::table::CommandTable;

/// Reads whole commands from an [`InStream`].
///
/// Also an iterator: it yields commands until a clean end of stream and then
/// keeps returning `None`. A decode error is yielded once and ends iteration,
/// since the stream can no longer be trusted to sit on a frame boundary.
pub struct CommandReader<'t, S> {
    inner: FlowReader<S>,
    table: &'t CommandTable,
    finished: bool,
}

impl<S: InStream> CommandReader<'static, S> {
    /// Read with the built-in Hadoop Pipes table.
    pub fn new(inner: S) -> Self {
        Self::with_table(inner, CommandTable::pipes())
    }
}

impl<'t, S: InStream> CommandReader<'t, S> {
    /// Read with a caller-supplied table.
    pub fn with_table(inner: S, table: &'t CommandTable) -> Self {
        Self::with_config(inner, table, FlowConfig::default())
    }

    /// Read with a caller-supplied table and decoding limits.
    pub fn with_config(inner: S, table: &'t CommandTable, config: FlowConfig) -> Self {
        Self {
            inner: FlowReader::with_config(inner, config),
            table,
            finished: false,
        }
    }

    /// Read the next command (blocking).
    ///
    /// Returns an end-of-stream error (see
    /// [`CommandError::is_end_of_stream`](crate::CommandError::is_end_of_stream))
    /// when the stream ends cleanly between commands.
    pub fn read_command(&mut self) -> Result<Command> {
        let config = *self.inner.config();
        let command = decode_command(self.table, self.inner.get_mut(), &config)?;
        trace!(code = command.code, name = %command.name, "read command");
        Ok(command)
    }

    /// Read up to `n` commands, stopping early at a clean end of stream.
    pub fn read_batch(&mut self, n: usize) -> Result<Vec<Command>> {
        let mut batch = Vec::with_capacity(n.min(1024));
        while batch.len() < n {
            match self.next() {
                Some(command) => batch.push(command?),
                None => break,
            }
        }
        Ok(batch)
    }

    /// Whether iteration has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn table(&self) -> &'t CommandTable {
        self.table
    }

    /// Bytes consumed from the underlying stream so far.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Close the underlying stream.
    pub fn close(&mut self) -> Result<()> {
        self.finished = true;
        self.inner.close()?;
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        self.inner.get_ref()
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        self.inner.get_mut()
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

impl<S: InStream> Iterator for CommandReader<'_, S> {
    type Item = Result<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_command() {
            Ok(command) => Some(Ok(command)),
            Err(err) if err.is_end_of_stream() => {
                debug!(position = self.inner.position(), "command stream ended");
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<S: InStream> FusedIterator for CommandReader<'_, S> {}

impl<S> std::fmt::Debug for CommandReader<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandReader")
            .field("commands", &self.table.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
