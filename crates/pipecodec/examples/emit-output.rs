//! A word-count map task driven over in-memory streams.
//!
//! The "host" half writes the downward commands a task tracker would send;
//! the task half decodes them, splits each value into words and answers with
//! `OUTPUT` frames, then `DONE`.
//!
//! Run with:
//!   cargo run --example emit-output

use pipecodec::command::{codes, Command, CommandReader, CommandWriter};
use pipecodec::flow::{FileSplit, Value};
use pipecodec::stream::{BufferInStream, BufferOutStream};

fn host_stream() -> Result<BufferInStream, Box<dyn std::error::Error>> {
    let split = FileSplit {
        filename: "hdfs://namenode/input/words.txt".to_string(),
        offset: 0,
        length: 42,
    };

    let mut host = CommandWriter::new(BufferOutStream::new());
    host.write_command(codes::START_MESSAGE, &[Value::Int(0)])?;
    host.write_command(
        codes::RUN_MAP,
        &[Value::Bytes(split.encode()?), Value::Int(1), Value::Int(0)],
    )?;
    host.write_command(codes::MAP_ITEM, &["0".into(), "hello pipes hello".into()])?;
    host.write_command(codes::MAP_ITEM, &["18".into(), "bye pipes".into()])?;
    host.write_command(codes::CLOSE, &[])?;
    host.flush()?;
    Ok(BufferInStream::new(host.into_inner().into_bytes()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut task = CommandWriter::new(BufferOutStream::new());

    for command in CommandReader::new(host_stream()?) {
        let command = command?;
        match command.code {
            codes::RUN_MAP => {
                if let Some(raw) = command.arg(0).and_then(Value::as_bytes) {
                    let split = FileSplit::decode(raw)?;
                    eprintln!("mapping {} [{}+{}]", split.filename, split.offset, split.length);
                }
            }
            codes::MAP_ITEM => {
                let line = command.arg(1).and_then(Value::as_str).unwrap_or_default();
                for word in line.split_whitespace() {
                    task.write_output(word.as_bytes(), b"1", None)?;
                }
            }
            codes::CLOSE => break,
            _ => eprintln!("ignoring {command}"),
        }
    }
    task.write_command(codes::DONE, &[])?;
    task.flush()?;

    let upward = task.into_inner().into_bytes();
    eprintln!("task produced {} bytes", upward.len());
    for command in CommandReader::new(BufferInStream::new(upward)) {
        let command: Command = command?;
        println!("{command}");
    }
    Ok(())
}
