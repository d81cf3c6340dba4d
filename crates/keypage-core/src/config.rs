//! Paginator configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Page size used when the request does not ask for a positive one.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Largest page size a request may receive.
pub const MAX_PER_PAGE: u32 = 100;

/// Page size policy and cursor resolution policy.
///
/// ## Example
///
/// ```rust
/// use keypage_core::PaginatorConfig;
///
/// let config = PaginatorConfig::default().with_max_per_page(25);
/// assert_eq!(config.clamp_limit(Some(1000)), 25);
/// assert_eq!(config.clamp_limit(Some(0)), 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "paginator configurations must be used to build a paginator"]
pub struct PaginatorConfig {
    /// Page size used when the request omits the limit or gives zero or a negative value
    #[cfg_attr(
        feature = "config",
        arg(
            long = "page-default-limit",
            env = "PAGE_DEFAULT_LIMIT",
            default_value_t = DEFAULT_PER_PAGE
        )
    )]
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Largest page size a request may receive
    #[cfg_attr(
        feature = "config",
        arg(
            long = "page-max-limit",
            env = "PAGE_MAX_LIMIT",
            default_value_t = MAX_PER_PAGE
        )
    )]
    #[serde(default = "max_per_page")]
    pub max_per_page: u32,

    /// Reject cursors that do not resolve to a record instead of restarting from the edge
    #[cfg_attr(
        feature = "config",
        arg(long = "page-strict-cursors", env = "PAGE_STRICT_CURSORS")
    )]
    #[serde(default)]
    pub strict_cursors: bool,
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn max_per_page() -> u32 {
    MAX_PER_PAGE
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            strict_cursors: false,
        }
    }
}

impl PaginatorConfig {
    /// Sets the default page size.
    #[inline]
    pub fn with_default_per_page(mut self, default_per_page: u32) -> Self {
        self.default_per_page = default_per_page;
        self
    }

    /// Sets the maximum page size.
    #[inline]
    pub fn with_max_per_page(mut self, max_per_page: u32) -> Self {
        self.max_per_page = max_per_page;
        self
    }

    /// Enables or disables strict cursor resolution.
    #[inline]
    pub fn with_strict_cursors(mut self, strict_cursors: bool) -> Self {
        self.strict_cursors = strict_cursors;
        self
    }

    /// Clamps a requested page size into `1..=max_per_page`.
    ///
    /// Missing, zero and negative limits fall back to `default_per_page`
    /// (itself capped at `max_per_page`); limits above the maximum are capped.
    pub fn clamp_limit(&self, limit: Option<i64>) -> u32 {
        let max = self.max_per_page.max(1);

        match limit {
            Some(limit) if limit > 0 => u32::try_from(limit).map_or(max, |limit| limit.min(max)),
            _ => self.default_per_page.clamp(1, max),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_per_page == 0 {
            return Err(ConfigError("max_per_page must be positive".into()));
        }

        if self.default_per_page == 0 {
            return Err(ConfigError("default_per_page must be positive".into()));
        }

        if self.default_per_page > self.max_per_page {
            return Err(ConfigError(
                format!(
                    "default_per_page ({}) must not exceed max_per_page ({})",
                    self.default_per_page, self.max_per_page
                )
                .into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_defaults() {
        let config = PaginatorConfig::default();
        assert_eq!(config.clamp_limit(None), DEFAULT_PER_PAGE);
        assert_eq!(config.clamp_limit(Some(0)), DEFAULT_PER_PAGE);
        assert_eq!(config.clamp_limit(Some(-5)), DEFAULT_PER_PAGE);
    }

    #[test]
    fn clamp_maximum() {
        let config = PaginatorConfig::default();
        assert_eq!(config.clamp_limit(Some(101)), MAX_PER_PAGE);
        assert_eq!(config.clamp_limit(Some(i64::MAX)), MAX_PER_PAGE);
        assert_eq!(config.clamp_limit(Some(100)), 100);
        assert_eq!(config.clamp_limit(Some(1)), 1);
    }

    #[test]
    fn validation() {
        assert!(PaginatorConfig::default().validate().is_ok());
        assert!(PaginatorConfig::default().with_max_per_page(0).validate().is_err());
        assert!(PaginatorConfig::default().with_default_per_page(0).validate().is_err());
        assert!(
            PaginatorConfig::default()
                .with_default_per_page(200)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: PaginatorConfig = serde_json::from_str(r#"{"max_per_page": 20}"#).unwrap();
        assert_eq!(config.default_per_page, DEFAULT_PER_PAGE);
        assert_eq!(config.max_per_page, 20);
        assert!(!config.strict_cursors);
    }
}
