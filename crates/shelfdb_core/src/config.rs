//! Database configuration.

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the database root if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to sync the WAL file on every queued write (safer but slower).
    pub sync_on_write: bool,

    /// Maximum number of live (non-tombstone) records a segment may hold
    /// before inserts roll over to a new segment file.
    pub segment_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_write: true,
            segment_capacity: 1000,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database root if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync the WAL on every queued write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets the live-record capacity of a segment file.
    #[must_use]
    pub const fn segment_capacity(mut self, capacity: usize) -> Self {
        self.segment_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert!(config.sync_on_write);
        assert_eq!(config.segment_capacity, 1000);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .create_if_missing(false)
            .sync_on_write(false)
            .segment_capacity(16);

        assert!(!config.create_if_missing);
        assert!(!config.sync_on_write);
        assert_eq!(config.segment_capacity, 16);
    }
}
