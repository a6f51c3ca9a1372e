//! Purpose: Shared local state-directory and overlay path resolution helpers.
//! Exports: `default_state_dir`, `POSTS_OVERLAY_KEY`, `posts_overlay`.
//! Role: Keep CLI and tests agreeing on where the overlay lives.
//! Invariants: Default state directory remains `~/.crudlet`.
//! Invariants: The posts overlay is `<state-dir>/posts.json`.

use std::path::{Path, PathBuf};

use crate::api::{JsonFileOverlay, Post};

/// Fixed storage key for locally created posts.
pub const POSTS_OVERLAY_KEY: &str = "posts";

pub fn default_state_dir() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".crudlet")
}

pub fn posts_overlay(state_dir: &Path) -> JsonFileOverlay<Post> {
    JsonFileOverlay::in_dir(state_dir, POSTS_OVERLAY_KEY)
}
