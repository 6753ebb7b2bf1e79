use pipecodec_command::CommandTable;
use pipecodec_writable::WritableRegistry;

use crate::cmd::RulesArgs;
use crate::exit::{writable_error, CliResult, SUCCESS};
use crate::output::{print_command_table, print_shapes, OutputFormat};

pub fn run(args: RulesArgs, format: OutputFormat) -> CliResult<i32> {
    let Some(path) = args.writables else {
        print_command_table(CommandTable::pipes().iter(), format);
        return Ok(SUCCESS);
    };

    let registry =
        WritableRegistry::from_file(&path).map_err(|err| writable_error("load failed", err))?;
    let shapes: Vec<(&str, String, bool)> = registry
        .shapes()
        .into_iter()
        .filter_map(|shape| {
            registry
                .rule(shape)
                .map(|rule| (shape, rule.to_string(), rule.is_scalar()))
        })
        .collect();
    print_shapes(&shapes, format);
    Ok(SUCCESS)
}
