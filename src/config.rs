//! Configuration for [`crate::ConversionOrchestrator`].
//!
//! There is only one knob today, the upload size ceiling, but it goes through
//! the same builder as everything else so callers never construct a config
//! that [`OrchestratorConfigBuilder::build`] would reject.

use crate::error::{MurkdownError, MIB};

/// Default upload size ceiling: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * MIB;

/// Configuration for a [`crate::ConversionOrchestrator`].
///
/// # Example
/// ```rust
/// use murkdown::OrchestratorConfig;
///
/// let config = OrchestratorConfig::builder()
///     .max_file_size_mb(25)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_file_size, 25 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Largest accepted input, in bytes (inclusive). Default: 100 MiB.
    pub max_file_size: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new builder for `OrchestratorConfig`.
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`OrchestratorConfig`].
#[derive(Debug)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn max_file_size_mb(mut self, mib: u64) -> Self {
        self.config.max_file_size = mib.saturating_mul(MIB);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OrchestratorConfig, MurkdownError> {
        if self.config.max_file_size == 0 {
            return Err(MurkdownError::InvalidConfig(
                "Maximum file size must be > 0".into(),
            ));
        }
        Ok(self.config)
    }
}
