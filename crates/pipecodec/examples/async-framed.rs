//! Stream commands across a tokio duplex pipe with `FramedWrite`/`FramedRead`.
//!
//! Run with:
//!   cargo run --example async-framed --features async

use futures_util::{SinkExt, StreamExt};
use pipecodec::command::{codes, Command, CommandCodec, CommandTable};
use pipecodec::flow::Value;
use tokio_util::codec::{FramedRead, FramedWrite};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let table = CommandTable::pipes();
    // A tiny buffer forces frames to straddle reads.
    let (task_side, host_side) = tokio::io::duplex(8);

    let writer = tokio::spawn(async move {
        let mut sink = FramedWrite::new(task_side, CommandCodec::new());
        let status = table.lookup_code(codes::STATUS)?;
        sink.send(Command::new(status, vec![Value::from("reading input")]))
            .await?;
        let progress = table.lookup_code(codes::PROGRESS)?;
        for step in 1..=4 {
            sink.send(Command::new(progress, vec![Value::Float(step as f32 / 4.0)]))
                .await?;
        }
        let done = table.lookup_code(codes::DONE)?;
        sink.send(Command::new(done, Vec::new())).await?;
        Ok::<_, pipecodec::command::CommandError>(())
    });

    let mut frames = FramedRead::new(host_side, CommandCodec::new());
    while let Some(command) = frames.next().await {
        let command = command?;
        println!("{command}");
        if command.code == codes::DONE {
            break;
        }
    }

    writer.await??;
    Ok(())
}
