use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pipecodec_command::codes::is_upward;
use pipecodec_command::{Command, CommandSpec};
use pipecodec_flow::Value;
use serde::Serialize;
use serde_json::json;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct CommandOutput<'a> {
    offset: u64,
    code: i32,
    name: &'a str,
    direction: &'static str,
    args: Vec<serde_json::Value>,
}

/// One decoded command plus the stream offset its frame started at.
pub struct DecodedCommand {
    pub offset: u64,
    pub command: Command,
}

pub fn print_commands(commands: &[DecodedCommand], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for decoded in commands {
                let out = CommandOutput {
                    offset: decoded.offset,
                    code: decoded.command.code,
                    name: &decoded.command.name,
                    direction: direction(decoded.command.code),
                    args: decoded.command.args.iter().map(value_json).collect(),
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OFFSET", "CODE", "NAME", "ARGS"]);
            for decoded in commands {
                let args: Vec<String> = decoded.command.args.iter().map(value_text).collect();
                table.add_row(vec![
                    decoded.offset.to_string(),
                    decoded.command.code.to_string(),
                    decoded.command.name.to_string(),
                    args.join(", "),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for decoded in commands {
                println!("@{} {}", decoded.offset, decoded.command);
            }
        }
    }
}

#[derive(Serialize)]
struct SpecOutput<'a> {
    code: i32,
    name: &'a str,
    rule: String,
    direction: &'static str,
}

pub fn print_command_table<'a>(specs: impl Iterator<Item = &'a CommandSpec>, format: OutputFormat) {
    let rows: Vec<SpecOutput<'_>> = specs
        .map(|spec| SpecOutput {
            code: spec.code,
            name: &spec.name,
            rule: spec.rule.to_string(),
            direction: direction(spec.code),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CODE", "NAME", "RULE", "DIRECTION"]);
            for row in &rows {
                table.add_row(vec![
                    row.code.to_string(),
                    row.name.to_string(),
                    row.rule.clone(),
                    row.direction.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!("{:>3} {:<20} {:<4} {}", row.code, row.name, row.rule, row.direction);
            }
        }
    }
}

#[derive(Serialize)]
struct ShapeOutput<'a> {
    shape: &'a str,
    rule: String,
    scalar: bool,
}

pub fn print_shapes(shapes: &[(&str, String, bool)], format: OutputFormat) {
    let rows: Vec<ShapeOutput<'_>> = shapes
        .iter()
        .map(|(shape, rule, scalar)| ShapeOutput {
            shape,
            rule: rule.clone(),
            scalar: *scalar,
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SHAPE", "RULE", "SCALAR"]);
            for row in &rows {
                table.add_row(vec![
                    row.shape.to_string(),
                    row.rule.clone(),
                    row.scalar.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!("{} = {}", row.shape, row.rule);
            }
        }
    }
}

fn direction(code: i32) -> &'static str {
    if is_upward(code) {
        "upward"
    } else {
        "downward"
    }
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Int(v) => json!(v),
        Value::Long(v) => json!(v),
        Value::Float(v) => json!(v),
        Value::Bytes(bytes) => json!(payload_preview(bytes)),
        Value::Null => serde_json::Value::Null,
        Value::Array(items) => items
            .iter()
            .map(|item| json!(payload_preview(item)))
            .collect(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Bytes(bytes) => payload_preview(bytes),
        Value::Null => "null".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(|item| payload_preview(item)).collect();
            format!("[{}]", items.join(", "))
        }
        other => value_json(other).to_string(),
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
