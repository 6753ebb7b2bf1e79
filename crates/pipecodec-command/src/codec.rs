use bytes::{Buf, BytesMut};
use pipecodec_flow::{FlowConfig, FlowError};
use pipecodec_stream::{BufferInStream, InStream};
use tokio_util::codec::{Decoder, Encoder};

use crate::command::{decode_command, encode_command, Command};
use crate::error::{CommandError, Result};
use crate::table::CommandTable;

/// `tokio_util` codec for Pipes commands, for use with `FramedRead` and
/// `FramedWrite`.
#[derive(Debug, Clone)]
pub struct CommandCodec<'t> {
    table: &'t CommandTable,
    config: FlowConfig,
}

impl CommandCodec<'static> {
    /// Codec over the built-in Hadoop Pipes table.
    pub fn new() -> Self {
        Self::with_table(CommandTable::pipes())
    }
}

impl Default for CommandCodec<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> CommandCodec<'t> {
    pub fn with_table(table: &'t CommandTable) -> Self {
        Self::with_config(table, FlowConfig::default())
    }

    pub fn with_config(table: &'t CommandTable, config: FlowConfig) -> Self {
        Self { table, config }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }
}

impl Decoder for CommandCodec<'_> {
    type Item = Command;
    type Error = CommandError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Command>> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut input = BufferInStream::borrowed(&src[..]);
        let command = match decode_command(self.table, &mut input, &self.config) {
            Ok(command) => command,
            // Incomplete frame; wait for more bytes.
            Err(CommandError::Flow(FlowError::EndOfStream | FlowError::Truncated { .. })) => {
                return Ok(None)
            }
            Err(err) => return Err(err),
        };
        let consumed = input.position() as usize;
        src.advance(consumed);
        Ok(Some(command))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Command>> {
        match self.decode(buf)? {
            Some(command) => Ok(Some(command)),
            None if buf.is_empty() => Ok(None),
            None => Err(FlowError::Truncated { what: "command" }.into()),
        }
    }
}

impl Encoder<Command> for CommandCodec<'_> {
    type Error = CommandError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        <Self as Encoder<&Command>>::encode(self, &item, dst)
    }
}

impl Encoder<&Command> for CommandCodec<'_> {
    type Error = CommandError;

    fn encode(&mut self, item: &Command, dst: &mut BytesMut) -> Result<()> {
        // Encode into a scratch buffer so a rejected command leaves `dst` as is.
        let mut frame = BytesMut::new();
        encode_command(self.table, item.code, &item.args, &mut frame)?;
        dst.extend_from_slice(&frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures_util::{SinkExt, StreamExt};
    use pipecodec_flow::Value;
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::codes;

    fn command(code: i32, args: Vec<Value>) -> Command {
        Command::new(CommandTable::pipes().by_code(code).unwrap(), args)
    }

    #[test]
    fn decode_waits_for_complete_frame() {
        let mut codec = CommandCodec::new();
        let mut full = BytesMut::new();
        codec
            .encode(command(codes::OUTPUT, vec![Value::from("k1"), Value::from("v1")]), &mut full)
            .unwrap();

        let mut partial = BytesMut::from(&full[..4]);
        assert!(codec.decode(&mut partial).unwrap().is_none());
        assert_eq!(partial.len(), 4);

        partial.extend_from_slice(&full[4..]);
        let cmd = codec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(cmd.code, codes::OUTPUT);
        assert!(partial.is_empty());
    }

    #[test]
    fn decode_large_frame_fed_in_chunks() {
        let mut codec = CommandCodec::new();
        let status = "x".repeat(256 * 1024);
        let mut full = BytesMut::new();
        codec
            .encode(command(codes::STATUS, vec![Value::from(status.as_str())]), &mut full)
            .unwrap();
        codec
            .encode(command(codes::PROGRESS, vec![Value::Float(0.5)]), &mut full)
            .unwrap();

        let mut src = BytesMut::new();
        let mut decoded = Vec::new();
        for chunk in full.chunks(4096) {
            src.extend_from_slice(chunk);
            while let Some(cmd) = codec.decode(&mut src).unwrap() {
                decoded.push(cmd);
            }
        }

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].args, vec![Value::from(status.as_str())]);
        assert_eq!(decoded[1].code, codes::PROGRESS);
        assert!(src.is_empty());
    }

    #[test]
    fn decode_rejects_unknown_code() {
        let mut codec = CommandCodec::new();
        let mut buf = BytesMut::from(&[11u8][..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CommandError::UnknownCode(11))
        ));
    }

    #[test]
    fn decode_eof_with_leftover_is_truncation() {
        let mut codec = CommandCodec::new();
        let mut buf = BytesMut::from(&[codes::STATUS as u8, 5, b'a'][..]);
        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Flow(FlowError::Truncated { .. })
        ));

        let mut empty = BytesMut::new();
        assert!(codec.decode_eof(&mut empty).unwrap().is_none());
    }

    #[test]
    fn encode_failure_leaves_dst_untouched() {
        let mut codec = CommandCodec::new();
        let mut dst = BytesMut::from(&b"prefix"[..]);
        let bad = Command {
            code: codes::RUN_REDUCE,
            name: "RUN_REDUCE".into(),
            args: vec![Value::Int(0), Value::from("not an int")],
        };
        assert!(codec.encode(&bad, &mut dst).is_err());
        assert_eq!(&dst[..], b"prefix");
    }

    #[tokio::test]
    async fn framed_roundtrip_over_duplex() {
        let (client, server) = tokio::io::duplex(64);
        let mut sink = FramedWrite::new(client, CommandCodec::new());
        let mut stream = FramedRead::new(server, CommandCodec::new());

        let sent = vec![
            command(codes::START_MESSAGE, vec![Value::Int(0)]),
            command(
                codes::SET_JOB_CONF,
                vec![Value::Array(vec![
                    Bytes::from_static(b"mapreduce.job.name"),
                    Bytes::from_static(b"wordcount"),
                ])],
            ),
            command(codes::CLOSE, vec![]),
        ];

        let expected = sent.clone();
        let writer = tokio::spawn(async move {
            for cmd in sent {
                sink.send(cmd).await.unwrap();
            }
        });

        let mut received = Vec::new();
        while received.len() < expected.len() {
            received.push(stream.next().await.unwrap().unwrap());
        }
        writer.await.unwrap();

        assert_eq!(received, expected);
    }
}
