//! Builder configuration.

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;
use crate::{Result, ScopeQlError};

/// Page size applied when a caller supplies no filter or no page size.
pub const DEFAULT_PAGE_SIZE: u8 = 20;

/// Largest page size a filter may request.
pub const MAX_PAGE_SIZE: u8 = 250;

/// Configuration for [`crate::SqlQueryBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Target SQL dialect
    pub dialect: DialectKind,
    /// Page size used when the filter does not set one
    pub default_page_size: u8,
    /// Upper bound for requested page sizes; larger requests are clamped
    pub max_page_size: u8,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            dialect: DialectKind::Postgres,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl BuilderConfig {
    /// Default configuration for the given dialect.
    pub fn for_dialect(dialect: DialectKind) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    /// Parses a configuration from JSON, filling unset fields with defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: BuilderConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks page-size bounds.
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(ScopeQlError::Configuration(
                "max_page_size must be at least 1".to_string(),
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ScopeQlError::Configuration(format!(
                "default_page_size must be between 1 and {} (got {})",
                self.max_page_size, self.default_page_size
            )));
        }
        Ok(())
    }
}
