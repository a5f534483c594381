//! Flutter bridge for Noteboard core.

pub mod api;
