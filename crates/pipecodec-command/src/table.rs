use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use pipecodec_flow::Rule;

use crate::codes::PIPES_COMMANDS;
use crate::error::{CommandError, Result};

/// One command table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub code: i32,
    pub name: Arc<str>,
    pub rule: Rule,
}

/// Map from command code to name and argument rule.
///
/// Codes and names are both unique, so lookup by either always resolves to
/// one entry.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    by_code: BTreeMap<i32, CommandSpec>,
    by_name: HashMap<Arc<str>, i32>,
}

static PIPES_TABLE: OnceLock<CommandTable> = OnceLock::new();

impl CommandTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide Hadoop Pipes table, built on first use.
    pub fn pipes() -> &'static CommandTable {
        PIPES_TABLE.get_or_init(Self::standard)
    }

    /// An owned copy of the Hadoop Pipes table.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (code, name, rule) in PIPES_COMMANDS {
            if let Err(err) = table.add_rule(code, name, rule) {
                tracing::error!(%err, code, command = name, "skipping malformed built-in command");
            }
        }
        table
    }

    /// Add an entry, parsing `rule` from its tag string.
    pub fn add_rule(&mut self, code: i32, name: &str, rule: &str) -> Result<()> {
        let rule = Rule::parse(rule)?;
        self.add(CommandSpec {
            code,
            name: Arc::from(name),
            rule,
        })
    }

    /// Add an entry. A reused code or name is rejected and leaves the table
    /// unchanged.
    pub fn add(&mut self, spec: CommandSpec) -> Result<()> {
        if self.by_code.contains_key(&spec.code) {
            return Err(CommandError::DuplicateCode(spec.code));
        }
        if self.by_name.contains_key(&spec.name) {
            return Err(CommandError::DuplicateName(spec.name.to_string()));
        }
        self.by_name.insert(Arc::clone(&spec.name), spec.code);
        self.by_code.insert(spec.code, spec);
        Ok(())
    }

    pub fn by_code(&self, code: i32) -> Option<&CommandSpec> {
        self.by_code.get(&code)
    }

    pub fn by_name(&self, name: &str) -> Option<&CommandSpec> {
        self.by_name
            .get(name)
            .and_then(|code| self.by_code.get(code))
    }

    /// Like [`CommandTable::by_code`], but an absent code is an error.
    pub fn lookup_code(&self, code: i32) -> Result<&CommandSpec> {
        self.by_code(code).ok_or(CommandError::UnknownCode(code))
    }

    /// Like [`CommandTable::by_name`], but an absent name is an error.
    pub fn lookup_name(&self, name: &str) -> Result<&CommandSpec> {
        self.by_name(name)
            .ok_or_else(|| CommandError::UnknownName(name.to_string()))
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> + '_ {
        self.by_code.values()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandTable {
    type Item = &'a CommandSpec;
    type IntoIter = std::collections::btree_map::Values<'a, i32, CommandSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_code.values()
    }
}
