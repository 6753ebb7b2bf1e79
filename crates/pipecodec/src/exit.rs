use std::fmt;
use std::io;

use pipecodec_command::CommandError;
use pipecodec_flow::FlowError;
use pipecodec_stream::StreamError;
use pipecodec_writable::WritableError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn stream_error(context: &str, err: StreamError) -> CliError {
    match err {
        StreamError::Open { path, source } => {
            io_error(&format!("{context} ({})", path.display()), source)
        }
        StreamError::Io(source) | StreamError::Duplicate(source) => io_error(context, source),
        StreamError::UnexpectedEof { .. } | StreamError::OutOfRange { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        StreamError::Closed => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

pub fn flow_error(context: &str, err: FlowError) -> CliError {
    match err {
        FlowError::Stream(err) => stream_error(context, err),
        other if other.is_protocol() || other.is_value() || other.is_end_of_stream() => {
            CliError::new(DATA_INVALID, format!("{context}: {other}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

/// Decode failures are bad input; build failures during `encode` are usage
/// errors since the arguments came from the command line.
pub fn command_error(context: &str, err: CommandError) -> CliError {
    match err {
        CommandError::Flow(err) => flow_error(context, err),
        CommandError::UnknownCode(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        CommandError::UnknownName(_) | CommandError::Arity { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn writable_error(context: &str, err: WritableError) -> CliError {
    match err {
        WritableError::Flow(err) => flow_error(context, err),
        WritableError::LoadFailed(_)
        | WritableError::InvalidJson(_)
        | WritableError::InvalidRule { .. }
        | WritableError::TooManyRules { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
