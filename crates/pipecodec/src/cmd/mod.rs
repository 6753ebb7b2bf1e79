use clap::{ArgGroup, Args, Subcommand};
use pipecodec_flow::FlowConfig;
use pipecodec_stream::{FileInStream, InStream, ReaderInStream};
use std::path::PathBuf;

use crate::exit::{stream_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod rules;
pub mod split;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a command stream and print each command.
    Decode(DecodeArgs),
    /// Encode one command frame.
    Encode(EncodeArgs),
    /// List the command table or a writable rule file.
    Rules(RulesArgs),
    /// Decode a serialized file split.
    Split(SplitArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: FlowConfig) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format, config),
        Command::Encode(args) => encode::run(args),
        Command::Rules(args) => rules::run(args, format),
        Command::Split(args) => split::run(args, format),
        Command::Version(args) => version::run(args, config),
    }
}

/// Open `path` for reading; `-` selects stdin.
fn open_input(path: &str) -> CliResult<Box<dyn InStream>> {
    if path == "-" {
        return Ok(Box::new(ReaderInStream::new(std::io::stdin().lock())));
    }
    let stream = FileInStream::open(path).map_err(|err| stream_error("open failed", err))?;
    Ok(Box::new(stream))
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Stream to decode, or `-` for stdin.
    pub path: String,
    /// Stop after N commands.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Skip this many leading bytes before the first command.
    #[arg(long, default_value_t = 0)]
    pub skip: u64,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("selector").required(true).args(["code", "name"])))]
pub struct EncodeArgs {
    /// Command code.
    #[arg(long)]
    pub code: Option<i32>,
    /// Command name (e.g. OUTPUT).
    #[arg(long)]
    pub name: Option<String>,
    /// Argument, once per rule item. `S` items accept `null`; `A` items
    /// take comma-separated elements.
    #[arg(long = "arg", value_name = "VALUE", allow_hyphen_values = true)]
    pub args: Vec<String>,
    /// Write to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Overwrite --output if it already exists.
    #[arg(long, requires = "output")]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// List shapes from a writable rule file instead of the command table.
    #[arg(long, value_name = "FILE")]
    pub writables: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// File holding the raw split bytes, or `-` for stdin.
    pub path: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Also list the command table size, decoding limits and enabled features.
    #[arg(long)]
    pub extended: bool,
}
