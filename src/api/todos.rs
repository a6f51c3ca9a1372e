//! Purpose: Todo list operations: filtered listing, add, completion toggle, delete.
//! Exports: `TodoBoard`.
//! Role: Thin layer over `ResourceService`; todos have no local overlay.
//! Invariants: Drafts are validated before any request; new todos start active.
#![allow(clippy::result_large_err)]

use tracing::debug;

use super::remote::ResourceService;
use super::sync::{Confirm, DeleteOutcome};
use crate::core::error::Error;
use crate::core::filter::{StatusFilter, apply_status_filter};
use crate::core::record::{Todo, TodoDraft, TodoPatch};
use crate::core::validate::Validate;

type ApiResult<T> = Result<T, Error>;

pub struct TodoBoard<S> {
    remote: S,
}

impl<S: ResourceService> TodoBoard<S> {
    pub fn new(remote: S) -> Self {
        Self { remote }
    }

    pub fn list(&self, filter: StatusFilter) -> ApiResult<Vec<Todo>> {
        let todos = self.remote.list::<Todo>()?;
        Ok(apply_status_filter(&todos, filter))
    }

    pub fn get(&self, id: u64) -> ApiResult<Todo> {
        self.remote.get::<Todo>(id)
    }

    pub fn add(&self, draft: &TodoDraft) -> ApiResult<Todo> {
        draft.validate()?;
        let draft = TodoDraft {
            completed: false,
            ..draft.clone()
        };
        let todo = self.remote.create::<Todo>(&draft)?;
        debug!(id = todo.id, "todo added");
        Ok(todo)
    }

    /// Sets the completion flag to `completed`.
    pub fn toggle_completion(&self, id: u64, completed: bool) -> ApiResult<Todo> {
        self.remote.update::<Todo>(id, &TodoPatch::completed(completed))
    }

    /// Flips the current completion flag of `id`.
    pub fn flip(&self, id: u64) -> ApiResult<Todo> {
        let current = self.get(id)?;
        self.toggle_completion(id, !current.completed)
    }

    pub fn delete(&self, id: u64, confirm: &impl Confirm) -> ApiResult<DeleteOutcome> {
        if !confirm.confirm(&format!("Delete todo {id}?")) {
            return Ok(DeleteOutcome::Cancelled);
        }
        self.remote.delete::<Todo>(id)?;
        Ok(DeleteOutcome::Deleted { overlay_removed: 0 })
    }
}
