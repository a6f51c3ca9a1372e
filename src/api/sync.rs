//! Purpose: Keep a remote collection and the local overlay presented as one list.
//! Exports: `ListSync`, `DisplayList`, `DeleteOutcome`, `Confirm`, `AssumeYes`.
//! Role: Two-tier store: remote mirror tier plus overlay tier, combined by `merge`.
//! Invariants: The overlay changes only after a successful remote write (create/delete).
//! Invariants: Writes on one collection are serialized (single-writer queue).
//! Invariants: Every successful write bumps the generation; loads that race a write refetch.
//! Invariants: Reads show an unreadable overlay as empty; writes abort on overlay I/O errors.
#![allow(clippy::result_large_err)]

use std::marker::PhantomData;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use super::remote::ResourceService;
use crate::core::error::{Error, ErrorKind};
use crate::core::merge::{DuplicatePolicy, Entry, Origin, merge};
use crate::core::overlay::OverlayStore;
use crate::core::record::{Post, PostPatch, Writable};
use crate::core::validate::Validate;

type ApiResult<T> = Result<T, Error>;

const LOAD_ATTEMPTS: usize = 3;

/// Interactive confirmation before destructive operations.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Skips confirmation (non-interactive callers, tests).
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted { overlay_removed: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayList<T> {
    pub entries: Vec<Entry<T>>,
    /// Write generation the list was built against.
    pub generation: u64,
    /// A write completed while this list was being built and retries ran out.
    pub stale: bool,
    /// The stored overlay was unreadable and treated as empty.
    pub overlay_recovered: bool,
}

impl<T> DisplayList<T> {
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct OverlayRead<T> {
    items: Vec<T>,
    recovered: bool,
}

pub struct ListSync<T, S, O> {
    remote: S,
    overlay: O,
    policy: DuplicatePolicy,
    writer: Mutex<()>,
    generation: AtomicU64,
    _records: PhantomData<fn() -> T>,
}

impl<T, S, O> ListSync<T, S, O>
where
    T: Writable,
    S: ResourceService,
    O: OverlayStore<T>,
{
    pub fn new(remote: S, overlay: O) -> Self {
        Self {
            remote,
            overlay,
            policy: DuplicatePolicy::default(),
            writer: Mutex::new(()),
            generation: AtomicU64::new(0),
            _records: PhantomData,
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// True when no write has completed since `list` was built.
    pub fn is_current(&self, list: &DisplayList<T>) -> bool {
        !list.stale && list.generation == self.generation()
    }

    pub fn load_display_list(&self) -> ApiResult<DisplayList<T>> {
        let mut attempt = 1;
        loop {
            let token = self.generation();
            let remote = self.remote.list::<T>()?;
            let overlay = self.read_overlay_for_display();
            let raced = self.generation() != token;
            if raced && attempt < LOAD_ATTEMPTS {
                debug!(
                    resource = T::RESOURCE.segment(),
                    attempt, "write landed during load; refetching"
                );
                attempt += 1;
                continue;
            }
            if raced {
                warn!(
                    resource = T::RESOURCE.segment(),
                    "display list may be stale; writes kept landing during load"
                );
            }
            return Ok(DisplayList {
                entries: merge(overlay.items, remote, self.policy),
                generation: token,
                stale: raced,
                overlay_recovered: overlay.recovered,
            });
        }
    }

    /// Remote copy first; an overlay-only record (never persisted upstream) is served locally.
    pub fn get_item(&self, id: u64) -> ApiResult<Entry<T>> {
        match self.remote.get::<T>(id) {
            Ok(item) => Ok(Entry {
                origin: Origin::Remote,
                item,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.read_overlay_for_display()
                    .items
                    .into_iter()
                    .find(|item| item.id() == id)
                    .map(|item| Entry {
                        origin: Origin::Overlay,
                        item,
                    })
                    .ok_or(err)
            }
            Err(err) => Err(err),
        }
    }

    pub fn create_item(&self, draft: &T::Draft) -> ApiResult<T> {
        draft.validate()?;
        let _writer = self.writer.lock().unwrap_or_else(|poison| poison.into_inner());
        let created = self.remote.create::<T>(draft)?;

        let _lock = self.overlay.lock()?;
        let mut overlay = self.read_overlay()?.items;
        overlay.insert(0, created.clone());
        self.overlay.save(&overlay)?;
        self.bump();
        debug!(
            resource = T::RESOURCE.segment(),
            id = created.id(),
            overlay_len = overlay.len(),
            "created"
        );
        Ok(created)
    }

    pub fn delete_item(&self, id: u64, confirm: &impl Confirm) -> ApiResult<DeleteOutcome> {
        let prompt = format!("Delete {} {id}?", T::RESOURCE.singular());
        if !confirm.confirm(&prompt) {
            return Ok(DeleteOutcome::Cancelled);
        }
        let _writer = self.writer.lock().unwrap_or_else(|poison| poison.into_inner());
        self.remote.delete::<T>(id)?;

        let _lock = self.overlay.lock()?;
        let mut overlay = self.read_overlay()?.items;
        let before = overlay.len();
        overlay.retain(|item| item.id() != id);
        let removed = before - overlay.len();
        if removed > 0 {
            self.overlay.save(&overlay)?;
        }
        self.bump();
        debug!(
            resource = T::RESOURCE.segment(),
            id, removed, "deleted"
        );
        Ok(DeleteOutcome::Deleted {
            overlay_removed: removed,
        })
    }

    pub fn clear_overlay(&self) -> ApiResult<usize> {
        let _writer = self.writer.lock().unwrap_or_else(|poison| poison.into_inner());
        let _lock = self.overlay.lock()?;
        let removed = self.read_overlay()?.items.len();
        self.overlay.clear()?;
        self.bump();
        Ok(removed)
    }

    pub fn overlay_items(&self) -> ApiResult<Vec<T>> {
        Ok(self.read_overlay()?.items)
    }

    fn read_overlay_for_display(&self) -> OverlayRead<T> {
        match self.overlay.load() {
            Ok(items) => OverlayRead {
                items: items.unwrap_or_default(),
                recovered: false,
            },
            Err(err) => {
                warn!(error = %err, "overlay unreadable; showing it as empty");
                OverlayRead {
                    items: Vec::new(),
                    recovered: true,
                }
            }
        }
    }

    /// Read-modify-write path: a corrupt document is replaced, any other failure aborts.
    fn read_overlay(&self) -> ApiResult<OverlayRead<T>> {
        match self.overlay.load() {
            Ok(items) => Ok(OverlayRead {
                items: items.unwrap_or_default(),
                recovered: false,
            }),
            Err(err) if err.kind() == ErrorKind::Corrupt => {
                warn!(error = %err, "overlay unreadable; treating as empty");
                Ok(OverlayRead {
                    items: Vec::new(),
                    recovered: true,
                })
            }
            Err(err) => Err(err),
        }
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl<S, O> ListSync<Post, S, O>
where
    S: ResourceService,
    O: OverlayStore<Post>,
{
    /// Edits re-validate the whole post after applying `patch`; the overlay is not touched.
    pub fn update_item(&self, id: u64, patch: &PostPatch) -> ApiResult<Post> {
        if patch.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("nothing to update")
                .with_hint("Pass at least one of --title, --body, --user-id."));
        }
        let current = self.get_item(id)?;
        current.item.patched(patch)?.validate()?;
        let _writer = self.writer.lock().unwrap_or_else(|poison| poison.into_inner());
        let updated = self.remote.update::<Post>(id, patch)?;
        self.bump();
        Ok(updated)
    }
}
