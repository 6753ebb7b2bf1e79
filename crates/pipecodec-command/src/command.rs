use std::fmt;
use std::sync::Arc;

use bytes::BufMut;
use pipecodec_flow::{
    check_tuple, decode_item, decode_tuple, encode_item, encode_tuple, FlowConfig, FlowError,
    TypeTag, Value,
};
use pipecodec_stream::InStream;

use crate::error::{CommandError, Result};
use crate::table::{CommandSpec, CommandTable};

/// One decoded (or to-be-written) command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub code: i32,
    pub name: Arc<str>,
    pub args: Vec<Value>,
}

impl Command {
    /// Build a command for a table entry.
    pub fn new(spec: &CommandSpec, args: Vec<Value>) -> Self {
        Self {
            code: spec.code,
            name: Arc::clone(&spec.name),
            args,
        }
    }

    pub fn arg(&self, idx: usize) -> Option<&Value> {
        self.args.get(idx)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write_value(f, arg)?;
        }
        write!(f, ")")
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Int(v) => write!(f, "{v}"),
        Value::Long(v) => write!(f, "{v}L"),
        Value::Float(v) => write!(f, "{v:?}"),
        Value::Bytes(b) => write!(f, "{:?}", String::from_utf8_lossy(b)),
        Value::Null => write!(f, "null"),
        Value::Array(items) => {
            write!(f, "[")?;
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", String::from_utf8_lossy(item))?;
            }
            write!(f, "]")
        }
    }
}

/// Validate `args` against `code`'s rule, then append the whole frame.
///
/// Unknown codes, wrong arity and uncoercible values are all reported before
/// anything is appended to `dst`.
pub fn encode_command(
    table: &CommandTable,
    code: i32,
    args: &[Value],
    dst: &mut impl BufMut,
) -> Result<()> {
    let spec = table.lookup_code(code)?;
    check_args(spec, args)?;
    encode_item(TypeTag::Int, &Value::Int(code), dst)?;
    encode_tuple(&spec.rule, args, dst)?;
    Ok(())
}

pub(crate) fn check_args(spec: &CommandSpec, args: &[Value]) -> Result<()> {
    if args.len() != spec.rule.len() {
        return Err(CommandError::Arity {
            name: spec.name.to_string(),
            expected: spec.rule.len(),
            found: args.len(),
        });
    }
    check_tuple(&spec.rule, args)?;
    Ok(())
}

/// Decode one command frame.
///
/// A clean end of stream before the code is passed through as end of stream;
/// running out anywhere after the code is a truncation.
pub fn decode_command<I>(table: &CommandTable, input: &mut I, config: &FlowConfig) -> Result<Command>
where
    I: InStream + ?Sized,
{
    let code = match decode_item(TypeTag::Int, input, config)? {
        Value::Int(code) => code,
        other => {
            return Err(FlowError::TypeMismatch {
                tag: TypeTag::Int,
                found: other.kind_name(),
            }
            .into())
        }
    };
    let spec = table.by_code(code).ok_or_else(|| {
        tracing::warn!(code, "unknown command code on the wire");
        CommandError::UnknownCode(code)
    })?;
    let args = decode_tuple(&spec.rule, input, config).map_err(|err| err.mid_frame("command"))?;
    Ok(Command::new(spec, args))
}
