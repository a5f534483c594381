//! Session lifecycle and durable session storage.
//!
//! # Responsibility
//! - Provide the application-state object views hold for one session.
//! - Persist sign-in and theme preference between process runs.

pub mod app_state;
pub mod storage;
