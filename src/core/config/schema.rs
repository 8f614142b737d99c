//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Engine Config
//!
//! Located at `$MODEL_DESCRIPTION_CONFIG` when set; otherwise defaults apply.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a typo in a policy name
//! fails loudly instead of silently falling back to the default.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Accepted values for `reference_policy`.
pub const REFERENCE_POLICIES: [&str; 3] = ["ignore", "warn", "error"];

/// Engine configuration as written on disk.
///
/// # Example
///
/// ```toml
/// reference_policy = "warn"
/// validate_on_import = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Handling of principal/subordinate tags that name no unit in the graph
    pub reference_policy: Option<String>,

    /// Validate the entity graph as the last step of import
    pub validate_on_import: Option<bool>,
}

impl EngineConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(policy) = &self.reference_policy {
            if !REFERENCE_POLICIES.contains(&policy.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid reference_policy '{}', must be one of: {}",
                    policy,
                    REFERENCE_POLICIES.join(", ")
                )));
            }
        }
        Ok(())
    }
}
