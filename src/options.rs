/// Tunables for compiling and running queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Deepest allowed nesting of parentheses, `select(...)` calls, `?`
    /// markers and `and`/`or` chains
    pub max_nesting: usize,
    /// Stop after this many results (a prefix of the full output)
    pub limit: Option<usize>,
}

impl Options {
    pub const DEFAULT_MAX_NESTING: usize = 256;

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_nesting: Self::DEFAULT_MAX_NESTING,
            limit: None,
        }
    }
}
