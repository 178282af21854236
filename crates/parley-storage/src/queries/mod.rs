// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations, one module per entity.

pub mod conversations;
pub mod messages;
pub mod participants;
pub mod users;
