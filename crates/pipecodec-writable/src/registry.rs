use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use pipecodec_flow::TypeTag;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{Result, WritableError};
use crate::object::shapes;
use crate::rule::WritableRule;

/// Shape-keyed registry of writable rules.
///
/// Owned by the caller and borrowed by readers and writers.
#[derive(Debug, Clone)]
pub struct WritableRegistry {
    rules: HashMap<String, WritableRule>,
    config: RegistryConfig,
}

/// On-disk layout: `{ "Shape": [["field", "i"], ...] }`.
type RuleFile = BTreeMap<String, Vec<(String, String)>>;

impl WritableRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            rules: HashMap::new(),
            config,
        }
    }

    /// A registry holding scalar rules for every bare [`Value`] kind.
    ///
    /// [`Value`]: pipecodec_flow::Value
    pub fn with_scalars() -> Self {
        let mut registry = Self::new();
        for (shape, tag) in [
            (shapes::INT, TypeTag::Int),
            (shapes::LONG, TypeTag::Long),
            (shapes::FLOAT, TypeTag::Float),
            (shapes::BYTES, TypeTag::Bytes),
            (shapes::NULLABLE, TypeTag::NullableBytes),
            (shapes::ARRAY, TypeTag::Array),
        ] {
            registry
                .rules
                .insert(shape.to_string(), WritableRule::scalar(tag));
        }
        registry
    }

    /// Register (or replace) the rule for `shape`. Returns the rule it
    /// replaced, if any.
    pub fn add(&mut self, shape: impl Into<String>, rule: WritableRule) -> Result<Option<WritableRule>> {
        let shape = shape.into();
        if !self.rules.contains_key(&shape) && self.rules.len() >= self.config.max_rules {
            return Err(WritableError::TooManyRules {
                max: self.config.max_rules,
            });
        }
        debug!(shape = %shape, rule = %rule, "registered writable rule");
        Ok(self.rules.insert(shape, rule))
    }

    /// Register a rule from `(field, tag-char)` pairs.
    pub fn add_fields<N: AsRef<str>, T: AsRef<str>>(
        &mut self,
        shape: &str,
        pairs: &[(N, T)],
    ) -> Result<Option<WritableRule>> {
        let rule = WritableRule::parse(shape, pairs)?;
        self.add(shape, rule)
    }

    /// The rule for `shape`, if registered.
    pub fn rule(&self, shape: &str) -> Option<&WritableRule> {
        self.rules.get(shape)
    }

    pub fn has_rule(&self, shape: &str) -> bool {
        self.rules.contains_key(shape)
    }

    /// Registered shapes, sorted.
    pub fn shapes(&self) -> Vec<&str> {
        let mut shapes: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        shapes.sort_unstable();
        shapes
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Load rules from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_config(json, RegistryConfig::default())
    }

    /// Load rules from a JSON document with explicit config.
    pub fn from_json_with_config(json: &str, config: RegistryConfig) -> Result<Self> {
        if json.len() > config.max_rule_file_size {
            return Err(WritableError::LoadFailed(format!(
                "rule document too large ({} bytes, max {})",
                json.len(),
                config.max_rule_file_size
            )));
        }
        let file: RuleFile = serde_json::from_str(json)?;
        let mut registry = Self::with_config(config);
        for (shape, pairs) in &file {
            registry.add_fields(shape, pairs)?;
        }
        Ok(registry)
    }

    /// Load rules from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_config(path, RegistryConfig::default())
    }

    /// Load rules from a JSON file with explicit config.
    pub fn from_file_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|err| {
            WritableError::LoadFailed(format!("failed opening {}: {err}", path.display()))
        })?;
        let metadata = file
            .metadata()
            .map_err(|err| WritableError::LoadFailed(err.to_string()))?;
        if !metadata.is_file() {
            return Err(WritableError::LoadFailed(format!(
                "not a regular file: {}",
                path.display()
            )));
        }
        if metadata.len() > config.max_rule_file_size as u64 {
            return Err(WritableError::LoadFailed(format!(
                "rule file too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }

        // The file may grow between the size check and the read.
        let read_limit = u64::try_from(config.max_rule_file_size.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                WritableError::LoadFailed(format!("failed reading {}: {err}", path.display()))
            })?;

        let registry = Self::from_json_with_config(&content, config)?;
        debug!(path = %path.display(), rules = registry.len(), "loaded writable rules");
        Ok(registry)
    }
}

impl Default for WritableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pipecodec-writable-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn add_and_lookup() {
        let mut registry = WritableRegistry::new();
        assert!(registry.rule("Point").is_none());

        let previous = registry
            .add_fields("Point", &[("x", "i"), ("y", "i")])
            .unwrap();
        assert!(previous.is_none());
        assert!(registry.has_rule("Point"));
        assert_eq!(registry.rule("Point").unwrap().flattened().to_string(), "ii");
    }

    #[test]
    fn re_adding_replaces() {
        let mut registry = WritableRegistry::new();
        registry.add("Id", WritableRule::scalar(TypeTag::Int)).unwrap();
        let previous = registry.add("Id", WritableRule::scalar(TypeTag::Long)).unwrap();
        assert_eq!(previous, Some(WritableRule::scalar(TypeTag::Int)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn max_rules_is_enforced() {
        let mut registry = WritableRegistry::with_config(RegistryConfig {
            max_rules: 1,
            ..RegistryConfig::default()
        });
        registry.add("A", WritableRule::scalar(TypeTag::Int)).unwrap();
        let err = registry.add("B", WritableRule::scalar(TypeTag::Int)).unwrap_err();
        assert!(matches!(err, WritableError::TooManyRules { max: 1 }));
        // Replacing an existing shape is still allowed.
        registry.add("A", WritableRule::scalar(TypeTag::Long)).unwrap();
    }

    #[test]
    fn scalar_defaults_cover_every_value_kind() {
        let registry = WritableRegistry::with_scalars();
        assert_eq!(
            registry.shapes(),
            vec!["array", "bytes", "float", "int", "long", "nullable"]
        );
        assert!(registry.shapes().iter().all(|s| registry.rule(s).unwrap().is_scalar()));
    }

    #[test]
    fn from_json_layout() {
        let json = r#"{
            "Point": [["x", "i"], ["y", "i"]],
            "Count": [["", "L"]]
        }"#;
        let registry = WritableRegistry::from_json(json).unwrap();
        assert_eq!(registry.shapes(), vec!["Count", "Point"]);
        assert!(registry.rule("Count").unwrap().is_scalar());
    }

    #[test]
    fn from_json_rejects_bad_input() {
        assert!(matches!(
            WritableRegistry::from_json("[1, 2]"),
            Err(WritableError::InvalidJson(_))
        ));
        assert!(matches!(
            WritableRegistry::from_json(r#"{"P": [["x", "z"]]}"#),
            Err(WritableError::InvalidRule { .. })
        ));
        assert!(matches!(
            WritableRegistry::from_json(r#"{"P": []}"#),
            Err(WritableError::InvalidRule { .. })
        ));
    }

    #[test]
    fn from_file_roundtrip_and_size_limit() {
        let dir = temp_dir("file");
        let path = dir.join("rules.json");
        std::fs::write(&path, r#"{"Pair": [["k", "s"], ["v", "s"]]}"#).unwrap();

        let registry = WritableRegistry::from_file(&path).unwrap();
        assert_eq!(registry.rule("Pair").unwrap().flattened().to_string(), "ss");

        let err = WritableRegistry::from_file_with_config(
            &path,
            RegistryConfig {
                max_rule_file_size: 8,
                ..RegistryConfig::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, WritableError::LoadFailed(_)));

        let err = WritableRegistry::from_file(&dir.join("missing.json")).unwrap_err();
        assert!(matches!(err, WritableError::LoadFailed(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
