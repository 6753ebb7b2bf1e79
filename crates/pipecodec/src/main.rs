mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use pipecodec_flow::{FlowConfig, DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_STRING_LEN};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "pipecodec", version, about = "Hadoop Pipes stream codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Largest string or byte payload accepted while decoding.
    #[arg(
        long,
        value_name = "BYTES",
        env = "PIPECODEC_MAX_STRING_LEN",
        default_value_t = DEFAULT_MAX_STRING_LEN,
        global = true
    )]
    max_string_len: usize,

    /// Largest array item count accepted while decoding.
    #[arg(
        long,
        value_name = "ITEMS",
        env = "PIPECODEC_MAX_ARRAY_LEN",
        default_value_t = DEFAULT_MAX_ARRAY_LEN,
        global = true
    )]
    max_array_len: usize,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn flow_config(&self) -> FlowConfig {
        FlowConfig {
            max_string_len: self.max_string_len,
            max_array_len: self.max_array_len,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = cli.flow_config();
    let result = cmd::run(cli.command, format, config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
