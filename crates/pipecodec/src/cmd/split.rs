use std::io::Read;

use pipecodec_flow::FileSplit;
use serde::Serialize;

use crate::cmd::SplitArgs;
use crate::exit::{flow_error, io_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct SplitOutput<'a> {
    filename: &'a str,
    offset: i64,
    length: i64,
}

pub fn run(args: SplitArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = if args.path == "-" {
        let mut raw = Vec::new();
        std::io::stdin()
            .read_to_end(&mut raw)
            .map_err(|err| io_error("read failed", err))?;
        raw
    } else {
        std::fs::read(&args.path).map_err(|err| io_error(&format!("read failed ({})", args.path), err))?
    };

    let split = FileSplit::decode(&raw).map_err(|err| flow_error("split decode failed", err))?;
    let out = SplitOutput {
        filename: &split.filename,
        offset: split.offset,
        length: split.length,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("file:   {}", out.filename);
            println!("offset: {}", out.offset);
            println!("length: {}", out.length);
        }
    }
    Ok(SUCCESS)
}
