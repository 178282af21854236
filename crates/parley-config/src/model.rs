// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley conversation service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Conversation behavior settings.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Presence evaluation settings.
    #[serde(default)]
    pub presence: PresenceConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Whether to enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "parley.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Conversation behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Length of generated conversation slugs.
    #[serde(default = "default_slug_length")]
    pub slug_length: usize,

    /// Number of most-recent messages returned on initial conversation load.
    #[serde(default = "default_initial_page_size")]
    pub initial_page_size: i64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            slug_length: default_slug_length(),
            initial_page_size: default_initial_page_size(),
        }
    }
}

fn default_slug_length() -> usize {
    10
}

fn default_initial_page_size() -> i64 {
    50
}

/// Presence evaluation configuration.
///
/// The online flag itself is owned by the external presence subsystem; the
/// timeout here bounds how stale a user's `last_seen_at` may be before the
/// core stops treating the flag as trustworthy at invite time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceConfig {
    /// Minutes since last activity after which a user counts as offline even
    /// if the online flag is still set.
    #[serde(default = "default_online_timeout_minutes")]
    pub online_timeout_minutes: i64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            online_timeout_minutes: default_online_timeout_minutes(),
        }
    }
}

fn default_online_timeout_minutes() -> i64 {
    15
}
