use bytes::BytesMut;
use pipecodec_flow::{encode_bytes, encode_item, FlowWriter, TypeTag, Value};
use pipecodec_stream::OutStream;
use tracing::trace;

use crate::codes::{OUTPUT, PARTITIONED_OUTPUT};
use crate::command::{encode_command, Command};
use crate::error::Result;
use crate::table::CommandTable;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes whole commands to an [`OutStream`].
///
/// A command is validated and encoded in full before any byte reaches the
/// stream, so a rejected command leaves the stream position unchanged.
pub struct CommandWriter<'t, S> {
    inner: FlowWriter<S>,
    table: &'t CommandTable,
    buf: BytesMut,
}

impl<S: OutStream> CommandWriter<'static, S> {
    /// Write with the built-in Hadoop Pipes table.
    pub fn new(inner: S) -> Self {
        Self::with_table(inner, CommandTable::pipes())
    }
}

impl<'t, S: OutStream> CommandWriter<'t, S> {
    /// Write with a caller-supplied table.
    pub fn with_table(inner: S, table: &'t CommandTable) -> Self {
        Self {
            inner: FlowWriter::new(inner),
            table,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode and write one command.
    pub fn write_command(&mut self, code: i32, args: &[Value]) -> Result<()> {
        self.buf.clear();
        encode_command(self.table, code, args, &mut self.buf)?;
        self.inner.write_raw(&self.buf)?;
        trace!(code, len = self.buf.len(), "wrote command");
        Ok(())
    }

    /// Write a command addressed by its table name.
    pub fn write_named(&mut self, name: &str, args: &[Value]) -> Result<()> {
        let code = self.table.lookup_name(name)?.code;
        self.write_command(code, args)
    }

    /// Write a previously built or decoded command.
    pub fn write(&mut self, command: &Command) -> Result<()> {
        self.write_command(command.code, &command.args)
    }

    /// Emit `OUTPUT` (or `PARTITIONED_OUTPUT` when `partition` is set) straight
    /// from borrowed key and value bytes.
    pub fn write_output(&mut self, key: &[u8], value: &[u8], partition: Option<i32>) -> Result<()> {
        self.buf.clear();
        match partition {
            Some(partition) => {
                encode_item(TypeTag::Int, &Value::Int(PARTITIONED_OUTPUT), &mut self.buf)?;
                encode_item(TypeTag::Int, &Value::Int(partition), &mut self.buf)?;
            }
            None => encode_item(TypeTag::Int, &Value::Int(OUTPUT), &mut self.buf)?,
        }
        encode_bytes(key, &mut self.buf)?;
        encode_bytes(value, &mut self.buf)?;
        self.inner.write_raw(&self.buf)?;
        trace!(?partition, len = self.buf.len(), "wrote output");
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Bytes produced on the underlying stream so far.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Flush and close the underlying stream.
    pub fn close(&mut self) -> Result<()> {
        self.inner.close()?;
        Ok(())
    }

    pub fn table(&self) -> &'t CommandTable {
        self.table
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        self.inner.get_ref()
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        self.inner.get_mut()
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

impl<S> std::fmt::Debug for CommandWriter<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandWriter")
            .field("commands", &self.table.len())
            .finish_non_exhaustive()
    }
}
