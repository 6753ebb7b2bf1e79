use pipecodec_command::codes::is_upward;
use pipecodec_command::CommandTable;
use pipecodec_flow::FlowConfig;
use pipecodec_writable::WritableRegistry;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs, config: FlowConfig) -> CliResult<i32> {
    if !args.extended {
        println!("pipecodec {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    for (key, value) in extended_info(&config) {
        println!("{key}: {value}");
    }
    Ok(SUCCESS)
}

/// Codec facts for `version --extended`, in print order.
fn extended_info(config: &FlowConfig) -> Vec<(&'static str, String)> {
    let table = CommandTable::pipes();
    let upward = table.iter().filter(|spec| is_upward(spec.code)).count();

    vec![
        ("name", "pipecodec".to_string()),
        ("version", env!("CARGO_PKG_VERSION").to_string()),
        (
            "platform",
            format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
        ),
        ("commands", table.len().to_string()),
        (
            "directions",
            format!("downward={}, upward={upward}", table.len() - upward),
        ),
        ("scalar_shapes", WritableRegistry::with_scalars().len().to_string()),
        ("max_string_len", config.max_string_len.to_string()),
        ("max_array_len", config.max_array_len.to_string()),
        (
            "features",
            format!(
                "writable={}, async={}, cli=true",
                cfg!(feature = "writable"),
                cfg!(feature = "async")
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use pipecodec_flow::DEFAULT_MAX_STRING_LEN;

    use super::*;

    fn lookup<'a>(info: &'a [(&'static str, String)], key: &str) -> &'a str {
        info.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing {key}"))
    }

    #[test]
    fn extended_info_describes_command_table() {
        let info = extended_info(&FlowConfig::default());
        assert_eq!(lookup(&info, "commands"), "19");
        assert_eq!(lookup(&info, "directions"), "downward=11, upward=8");
        assert_eq!(
            lookup(&info, "max_string_len"),
            DEFAULT_MAX_STRING_LEN.to_string()
        );
    }

    #[test]
    fn extended_info_reports_effective_limits() {
        let config = FlowConfig {
            max_array_len: 7,
            ..FlowConfig::default()
        };
        let info = extended_info(&config);
        assert_eq!(lookup(&info, "max_array_len"), "7");
    }
}
