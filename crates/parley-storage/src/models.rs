// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `parley-core::types` so the service
//! layer and storage layer share one vocabulary. This module re-exports them
//! for convenience within the storage crate.

pub use parley_core::types::{Conversation, Message, Participant, PendingInvitation, User};
