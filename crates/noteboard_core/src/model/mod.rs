//! Domain model for notes, tags and users.
//!
//! # Responsibility
//! - Define the wire-compatible entities shared by gateways and the store.
//! - Keep server-owned fields (ids, timestamps) out of request shapes.
//!
//! # Invariants
//! - Entities serialize with camelCase field names.
//! - Timestamps are UTC and RFC 3339 on the wire.

pub mod note;
pub mod tag;
pub mod user;
