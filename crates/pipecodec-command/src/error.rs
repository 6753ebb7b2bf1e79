use pipecodec_flow::FlowError;
use pipecodec_stream::StreamError;

/// Errors that can occur while reading, writing or building commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Encoding or decoding the code or arguments failed.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// The code is not in the command table.
    #[error("unknown command code {0}")]
    UnknownCode(i32),

    /// The name is not in the command table.
    #[error("unknown command name {0:?}")]
    UnknownName(String),

    /// A command was supplied with the wrong number of arguments.
    #[error("{name} takes {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A table entry reused an existing code.
    #[error("duplicate command code {0}")]
    DuplicateCode(i32),

    /// A table entry reused an existing name.
    #[error("duplicate command name {0:?}")]
    DuplicateName(String),
}

impl CommandError {
    /// Returns true for a clean end of stream between commands.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, CommandError::Flow(err) if err.is_end_of_stream())
    }

    /// Returns true for malformed framing or a table that would be ambiguous.
    pub fn is_protocol(&self) -> bool {
        match self {
            CommandError::Flow(err) => err.is_protocol(),
            CommandError::UnknownCode(_)
            | CommandError::UnknownName(_)
            | CommandError::Arity { .. }
            | CommandError::DuplicateCode(_)
            | CommandError::DuplicateName(_) => true,
        }
    }

    /// Returns true if an argument could not be represented under its tag.
    pub fn is_value(&self) -> bool {
        matches!(self, CommandError::Flow(err) if err.is_value())
    }

    /// Returns true if the underlying transport failed.
    pub fn is_io(&self) -> bool {
        matches!(self, CommandError::Flow(err) if err.is_io())
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::Flow(FlowError::Stream(StreamError::Io(err)))
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
