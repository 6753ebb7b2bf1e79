use pipecodec_command::{CommandReader, CommandTable};
use pipecodec_flow::FlowConfig;
use pipecodec_stream::InStream;
use tracing::{debug, warn};

use crate::cmd::{open_input, DecodeArgs};
use crate::exit::{command_error, stream_error, CliResult, SUCCESS};
use crate::output::{print_commands, DecodedCommand, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat, config: FlowConfig) -> CliResult<i32> {
    let mut input = open_input(&args.path)?;
    if args.skip > 0 {
        input
            .skip(args.skip)
            .map_err(|err| stream_error("skip failed", err))?;
    }

    let mut reader = CommandReader::with_config(input, CommandTable::pipes(), config);
    let mut decoded = Vec::new();
    let mut failure = None;

    while args.limit.map_or(true, |limit| decoded.len() < limit) {
        let offset = args.skip + reader.position();
        match reader.read_command() {
            Ok(command) => decoded.push(DecodedCommand { offset, command }),
            Err(err) if err.is_end_of_stream() => break,
            Err(err) => {
                warn!(offset, error = %err, "decode stopped");
                failure = Some(command_error(&format!("decode failed at byte {offset}"), err));
                break;
            }
        }
    }

    debug!(
        commands = decoded.len(),
        bytes = reader.position(),
        "decoded stream"
    );
    // Commands decoded before a failure are still worth showing.
    print_commands(&decoded, format);

    match failure {
        Some(err) => Err(err),
        None => Ok(SUCCESS),
    }
}
