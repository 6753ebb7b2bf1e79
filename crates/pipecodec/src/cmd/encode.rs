use pipecodec_command::{CommandSpec, CommandTable, CommandWriter};
use pipecodec_flow::{TypeTag, Value};
use pipecodec_stream::{FileOutStream, OutStream, WriterOutStream};
use tracing::debug;

use crate::cmd::EncodeArgs;
use crate::exit::{command_error, stream_error, CliError, CliResult, SUCCESS, USAGE};

/// Literal accepted for an absent `S` item.
const NULL_LITERAL: &str = "null";

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let table = CommandTable::pipes();
    let spec = resolve(table, &args)?;

    if args.args.len() != spec.rule.len() {
        return Err(CliError::new(
            USAGE,
            format!(
                "{} takes {} argument(s) ({}), got {}",
                spec.name,
                spec.rule.len(),
                spec.rule,
                args.args.len()
            ),
        ));
    }
    let values = spec
        .rule
        .iter()
        .zip(&args.args)
        .enumerate()
        .map(|(idx, (tag, raw))| parse_arg(tag, raw).map_err(|reason| {
            CliError::new(USAGE, format!("argument {idx} of {}: {reason}", spec.name))
        }))
        .collect::<CliResult<Vec<_>>>()?;

    let output: Box<dyn OutStream> = match &args.output {
        Some(path) => Box::new(
            FileOutStream::open_with(path, args.force)
                .map_err(|err| stream_error("open failed", err))?,
        ),
        None => Box::new(WriterOutStream::new(std::io::stdout().lock())),
    };

    let mut writer = CommandWriter::with_table(output, table);
    writer
        .write_command(spec.code, &values)
        .map_err(|err| command_error("encode failed", err))?;
    writer
        .close()
        .map_err(|err| command_error("encode failed", err))?;
    debug!(code = spec.code, bytes = writer.position(), "encoded command");

    Ok(SUCCESS)
}

fn resolve<'t>(table: &'t CommandTable, args: &EncodeArgs) -> CliResult<&'t CommandSpec> {
    let found = match (&args.name, args.code) {
        (Some(name), _) => table.lookup_name(name),
        (None, Some(code)) => table.lookup_code(code),
        (None, None) => {
            return Err(CliError::new(USAGE, "either --code or --name is required"));
        }
    };
    found.map_err(|err| command_error("encode failed", err))
}

fn parse_arg(tag: TypeTag, raw: &str) -> Result<Value, String> {
    let invalid = |err: &dyn std::fmt::Display| format!("{raw:?} is not a valid {}: {err}", tag.name());
    match tag {
        TypeTag::Int => raw.parse::<i32>().map(Value::Int).map_err(|err| invalid(&err)),
        TypeTag::Long => raw.parse::<i64>().map(Value::Long).map_err(|err| invalid(&err)),
        TypeTag::Float => raw.parse::<f32>().map(Value::Float).map_err(|err| invalid(&err)),
        TypeTag::Bytes => Ok(Value::from(raw)),
        TypeTag::NullableBytes if raw == NULL_LITERAL => Ok(Value::Null),
        TypeTag::NullableBytes => Ok(Value::from(raw)),
        TypeTag::Array if raw.is_empty() => Ok(Value::Array(Vec::new())),
        TypeTag::Array => Ok(Value::Array(
            raw.split(',').map(|item| item.to_string().into()).collect(),
        )),
    }
}
