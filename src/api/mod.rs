//! Purpose: Define the public Rust API boundary for crudlet.
//! Exports: Records, errors, overlay stores, and the synchronizer/board/directory types.
//! Role: Single import path for the CLI, the mock server, and integration tests.
//! Invariants: Transport and synchronizer internals stay private to this module tree.

mod remote;
mod sync;
mod todos;
mod users;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind, FieldIssue};
pub use crate::core::filter::{StatusFilter, apply_status_filter};
pub use crate::core::merge::{DuplicatePolicy, Entry, Origin, merge};
pub use crate::core::overlay::{JsonFileOverlay, MemoryOverlay, OverlayLock, OverlayStore};
pub use crate::core::record::{
    Address, Company, Geo, Post, PostDraft, PostPatch, Record, Resource, Todo, TodoDraft,
    TodoPatch, User, Writable,
};
pub use crate::core::validate::Validate;
pub use remote::{DEFAULT_BASE_URL, RemoteClient, ResourceService};
pub use sync::{AssumeYes, Confirm, DeleteOutcome, DisplayList, ListSync};
pub use todos::TodoBoard;
pub use users::UserDirectory;

/// The post synchronizer the CLI uses: HTTP remote plus the on-disk overlay.
pub type PostSync = ListSync<Post, RemoteClient, JsonFileOverlay<Post>>;
