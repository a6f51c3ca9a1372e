//! Purpose: End-to-end tests for the HTTP client, synchronizer, and overlay file.
//! Exports: None (integration test module).
//! Role: Drive `RemoteClient` + `ListSync` against the bundled mock server over TCP.
//! Invariants: Uses a loopback-only server and a temp state directory.
//! Invariants: Bounded waits avoid test flakiness.
//! Invariants: Server processes are cleaned up on drop.

use crudlet::api::{
    AssumeYes, DeleteOutcome, DuplicatePolicy, ErrorKind, JsonFileOverlay, ListSync, Origin, Post,
    PostDraft, PostPatch, RemoteClient, ResourceService, StatusFilter, Todo, TodoBoard, TodoDraft,
    UserDirectory,
};
use std::path::Path;

mod common;

use common::{TestResult, TestServer};

trait PostSyncExt {
    fn post_sync(
        &self,
        state_dir: &Path,
    ) -> TestResult<ListSync<Post, RemoteClient, JsonFileOverlay<Post>>>;
}

impl PostSyncExt for TestServer {
    fn post_sync(
        &self,
        state_dir: &Path,
    ) -> TestResult<ListSync<Post, RemoteClient, JsonFileOverlay<Post>>> {
        Ok(ListSync::new(
            self.client()?,
            JsonFileOverlay::in_dir(state_dir, "posts"),
        ))
    }
}

fn new_post_draft() -> PostDraft {
    PostDraft {
        title: "New Post Title".to_string(),
        body: "1234567890".to_string(),
        user_id: 2,
    }
}

#[test]
fn create_lands_in_overlay_and_leads_the_list() -> TestResult<()> {
    let temp_dir = tempfile::tempdir()?;
    let server = TestServer::start()?;
    let sync = server.post_sync(temp_dir.path())?;

    let created = sync.create_item(&new_post_draft())?;
    assert_eq!(created.id, 101);

    let stored: Vec<Post> =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("posts.json"))?)?;
    assert_eq!(stored, vec![created.clone()]);

    let list = sync.load_display_list()?;
    assert_eq!(list.len(), 101);
    assert_eq!(list.entries[0].origin, Origin::Overlay);
    assert_eq!(list.entries[0].item, created);
    assert_eq!(list.entries[1].item.id, 1);
    Ok(())
}

#[test]
fn overlay_survives_a_new_synchronizer() -> TestResult<()> {
    let temp_dir = tempfile::tempdir()?;
    let server = TestServer::start()?;
    server.post_sync(temp_dir.path())?.create_item(&new_post_draft())?;

    let reopened = server.post_sync(temp_dir.path())?;
    let overlay = reopened.overlay_items()?;
    assert_eq!(overlay.len(), 1);
    assert_eq!(overlay[0].title, "New Post Title");
    Ok(())
}

#[test]
fn failed_create_keeps_overlay_file_identical() -> TestResult<()> {
    let temp_dir = tempfile::tempdir()?;
    {
        let healthy = TestServer::start()?;
        healthy.post_sync(temp_dir.path())?.create_item(&new_post_draft())?;
    }
    let overlay_path = temp_dir.path().join("posts.json");
    let before = std::fs::read(&overlay_path)?;

    let failing = TestServer::start_with_faults(None, Some(500))?;
    let err = failing
        .post_sync(temp_dir.path())?
        .create_item(&new_post_draft())
        .expect_err("create should fail");
    assert_eq!(err.kind(), ErrorKind::RemoteWrite);
    assert_eq!(err.status(), Some(500));
    assert!(err.message().is_some_and(|m| m.contains("injected failure")));

    assert_eq!(std::fs::read(&overlay_path)?, before);
    Ok(())
}

#[test]
fn fetch_failure_surfaces_without_fallback() -> TestResult<()> {
    let temp_dir = tempfile::tempdir()?;
    let server = TestServer::start_with_faults(Some(503), None)?;
    let err = server
        .post_sync(temp_dir.path())?
        .load_display_list()
        .expect_err("load should fail");
    assert_eq!(err.kind(), ErrorKind::RemoteFetch);
    assert_eq!(err.status(), Some(503));
    assert!(err.hint().is_some());
    Ok(())
}

#[test]
fn delete_clears_local_copies() -> TestResult<()> {
    let temp_dir = tempfile::tempdir()?;
    let server = TestServer::start()?;
    let sync = server.post_sync(temp_dir.path())?;
    let created = sync.create_item(&new_post_draft())?;

    let outcome = sync.delete_item(created.id, &AssumeYes)?;
    assert_eq!(outcome, DeleteOutcome::Deleted { overlay_removed: 1 });
    let list = sync.load_display_list()?;
    assert!(
        list.entries
            .iter()
            .all(|entry| entry.origin == Origin::Remote)
    );
    Ok(())
}

#[test]
fn get_missing_post_is_not_found() -> TestResult<()> {
    let server = TestServer::start()?;
    let err = server.client()?.get::<Post>(9999).expect_err("missing");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.id(), Some(9999));
    Ok(())
}

#[test]
fn edit_patches_without_touching_overlay() -> TestResult<()> {
    let temp_dir = tempfile::tempdir()?;
    let server = TestServer::start()?;
    let sync = server.post_sync(temp_dir.path())?;

    let updated = sync.update_item(
        3,
        &PostPatch {
            title: Some("Edited title".to_string()),
            ..PostPatch::default()
        },
    )?;
    assert_eq!(updated.id, 3);
    assert_eq!(updated.title, "Edited title");
    assert!(!temp_dir.path().join("posts.json").exists());
    Ok(())
}

#[test]
fn keep_both_policy_shows_shadowed_duplicates() -> TestResult<()> {
    let temp_dir = tempfile::tempdir()?;
    let server = TestServer::start()?;
    let local = Post {
        id: 1,
        user_id: 1,
        title: "Local copy".to_string(),
        body: "kept on this machine".to_string(),
    };
    std::fs::write(
        temp_dir.path().join("posts.json"),
        serde_json::to_vec(&vec![local])?,
    )?;

    let default_list = server.post_sync(temp_dir.path())?.load_display_list()?;
    assert_eq!(default_list.len(), 100);

    let keep_both = server
        .post_sync(temp_dir.path())?
        .with_policy(DuplicatePolicy::KeepBoth)
        .load_display_list()?;
    assert_eq!(keep_both.len(), 101);
    assert_eq!(keep_both.items().filter(|post| post.id == 1).count(), 2);
    Ok(())
}

#[test]
fn corrupt_overlay_is_treated_as_empty() -> TestResult<()> {
    let temp_dir = tempfile::tempdir()?;
    let server = TestServer::start()?;
    std::fs::write(temp_dir.path().join("posts.json"), b"{not json")?;

    let list = server.post_sync(temp_dir.path())?.load_display_list()?;
    assert!(list.overlay_recovered);
    assert_eq!(list.len(), 100);
    Ok(())
}

#[test]
fn todo_board_filters_and_toggles() -> TestResult<()> {
    let server = TestServer::start()?;
    let board = TodoBoard::new(server.client()?);

    let all = board.list(StatusFilter::All)?;
    let active = board.list(StatusFilter::Active)?;
    let completed = board.list(StatusFilter::Completed)?;
    assert_eq!(all.len(), 200);
    assert_eq!(active.len() + completed.len(), all.len());

    let first: &Todo = &all[0];
    let toggled = board.toggle_completion(first.id, !first.completed)?;
    assert_eq!(toggled.completed, !first.completed);

    let added = board.add(&TodoDraft::new("water the plants", 4))?;
    assert_eq!(added.id, 201);
    assert!(!added.completed);
    Ok(())
}

#[test]
fn user_directory_lists_posts_by_author() -> TestResult<()> {
    let server = TestServer::start()?;
    let directory = UserDirectory::new(server.client()?);

    assert_eq!(directory.list()?.len(), 10);
    let user = directory.get(1)?;
    assert_eq!(user.username, "Bret");
    let posts = directory.posts_by(1)?;
    assert_eq!(posts.len(), 10);
    assert!(posts.iter().all(|post| post.user_id == 1));
    Ok(())
}
