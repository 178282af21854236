// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and positive page sizes.

use thiserror::Error;

use crate::model::ParleyConfig;

/// A configuration problem discovered at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A semantic constraint on a deserialized value failed.
    #[error("{message}")]
    Validation { message: String },

    /// Figment failed to parse or merge the configuration sources.
    #[error(transparent)]
    Parse(#[from] Box<figment::Error>),
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or all collected validation
/// errors (does not fail fast).
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.conversation.slug_length < 4 {
        errors.push(ConfigError::Validation {
            message: format!(
                "conversation.slug_length must be at least 4, got {}",
                config.conversation.slug_length
            ),
        });
    }

    if config.conversation.initial_page_size < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "conversation.initial_page_size must be positive, got {}",
                config.conversation.initial_page_size
            ),
        });
    }

    if config.presence.online_timeout_minutes < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "presence.online_timeout_minutes must be positive, got {}",
                config.presence.online_timeout_minutes
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
