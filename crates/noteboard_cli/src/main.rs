//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `noteboard_core` linkage.
//! - Run one demo session against the mock backend with deterministic output.

use noteboard_core::{AppState, MemorySessionStorage, MockGateway, NoteFilter};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("noteboard_core ping={}", noteboard_core::ping());
    println!("noteboard_core version={}", noteboard_core::core_version());

    let mut session = AppState::init(MockGateway::seeded(), MemorySessionStorage::new());
    if let Err(err) = session.login("demo", "demo") {
        eprintln!("demo login failed: {err}");
        return ExitCode::FAILURE;
    }

    let visible = session.visible_notes(&NoteFilter::default());
    println!("notes visible={}", visible.len());
    for note in visible {
        println!("  {} {} tags={}", note.id, note.title, note.tags.join(","));
    }
    ExitCode::SUCCESS
}
