// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration and update delivery for Parley.
//!
//! Two entry points, both constructed explicitly from a shared
//! [`ConversationStore`](parley_storage::ConversationStore) handle and a
//! [`ParleyConfig`](parley_config::ParleyConfig) at process start:
//!
//! - [`Orchestrator`]: the atomic multi-entity operations -- create, invite,
//!   respond, post -- plus the pull-based invitation listing.
//! - [`UpdateFeed`]: the cache-validator polling protocol clients use to
//!   discover new messages without a persistent connection.

pub mod feed;
pub mod orchestrator;

pub use feed::{FeedResponse, UpdateFeed};
pub use orchestrator::Orchestrator;
