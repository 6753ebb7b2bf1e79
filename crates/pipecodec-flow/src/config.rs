/// Default upper bound on a decoded string length: 64 MiB.
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024 * 1024;

/// Default upper bound on a decoded array count.
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Limits applied while decoding length-prefixed items.
///
/// Length prefixes come from the peer; the limits keep a corrupt or hostile
/// prefix from turning into a huge allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    /// Maximum byte length of one `s`/`S` item. Default: 64 MiB.
    pub max_string_len: usize,
    /// Maximum element count of one `A` item. Default: 1 Mi.
    pub max_array_len: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}
