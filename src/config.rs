//! Configuration for dyntable
//!
//! Centralized configuration with documented defaults.

/// Default number of attempts made by the optimistic retry loops
pub const DEFAULT_RETRIES: usize = 10;

/// Retry budget for compound mutation patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of conditional-write attempts (0 = fail without trying)
    pub retries: usize,
}

impl RetryConfig {
    pub fn with_retries(retries: usize) -> Self {
        Self { retries }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
        }
    }
}

/// Main configuration for a table instance
#[derive(Debug, Clone)]
pub struct TableConfig {
    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------
    /// Logical table name, carried in log events
    pub table_name: String,

    // -------------------------------------------------------------------------
    // Mutation Patterns
    // -------------------------------------------------------------------------
    /// Retry budget for this table's callers to hand to the mutation patterns
    /// (`table.config().retry`); the patterns themselves always take an
    /// explicit `RetryConfig`
    pub retry: RetryConfig,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table_name: "dyntable".to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl TableConfig {
    /// Create a new config builder
    pub fn builder() -> TableConfigBuilder {
        TableConfigBuilder::default()
    }
}

/// Builder for TableConfig
#[derive(Default)]
pub struct TableConfigBuilder {
    config: TableConfig,
}

impl TableConfigBuilder {
    /// Set the logical table name
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.config.table_name = name.into();
        self
    }

    /// Set the retry budget for compound mutation patterns
    pub fn retries(mut self, retries: usize) -> Self {
        self.config.retry = RetryConfig::with_retries(retries);
        self
    }

    pub fn build(self) -> TableConfig {
        self.config
    }
}
