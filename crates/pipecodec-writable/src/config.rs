/// Limits applied when building a registry, especially from untrusted files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of shapes a registry may hold.
    pub max_rules: usize,
    /// Maximum bytes accepted from a rule file.
    pub max_rule_file_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_rules: 1024,
            max_rule_file_size: 256 * 1024,
        }
    }
}
