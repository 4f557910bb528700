//! Tauri command layer

pub mod vault;
