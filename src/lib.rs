//! Purpose: Library crate behind the `crudlet` CLI and its tests.
//! Exports: `api` (public surface), `core` (records, policies, storage), `notice`, `state_paths`.
//! Role: Remote-backed CRUD client with a local overlay for created posts.
//! Invariants: Library code never prints; the binary owns stdout/stderr.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod notice;
pub mod state_paths;
