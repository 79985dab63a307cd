//! Parser configuration.

/// Nesting depth used when no explicit limit is configured.
///
/// Every nested expression, type, block or statement costs one level.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Name recorded in every span produced for this source
    pub file_name: String,
    /// Deepest nesting accepted before failing with `NestingTooDeep`
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            file_name: String::from("<input>"),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }
}
