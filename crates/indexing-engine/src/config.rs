//! Engine configuration derived from [`Settings`].

use indexing_types::Settings;

/// Per-instance options the indexing operations read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Chunks per bulk request, and the number of chunks an object is
    /// split into
    pub bulk_count: u32,

    /// Emit notices for each operation and response
    pub log_errors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bulk_count: 100,
            log_errors: false,
        }
    }
}

impl From<&Settings> for EngineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            bulk_count: settings.bulk_count,
            log_errors: settings.log_errors,
        }
    }
}

impl EngineConfig {
    pub fn with_bulk_count(mut self, bulk_count: u32) -> Self {
        self.bulk_count = bulk_count;
        self
    }

    pub fn with_log_errors(mut self, log_errors: bool) -> Self {
        self.log_errors = log_errors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            bulk_count: 7,
            log_errors: true,
            ..Default::default()
        };
        let config = EngineConfig::from(&settings);
        assert_eq!(config.bulk_count, 7);
        assert!(config.log_errors);
    }

    #[test]
    fn test_default_matches_settings_default() {
        assert_eq!(EngineConfig::default(), EngineConfig::from(&Settings::default()));
    }
}
