//! Purpose: Hold top-level CLI command dispatch for `crudlet`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Destructive commands confirm on a TTY and require `--yes` otherwise.
//! Invariants: Overlay recovery and stale lists surface as notices, never as failures.

use std::net::SocketAddr;

use super::*;
use crudlet::api::{
    AssumeYes, DeleteOutcome, DisplayList, ListSync, PostDraft, PostPatch, PostSync,
    RemoteClient, TodoBoard, TodoDraft, UserDirectory,
};
use crudlet::state_paths::posts_overlay;
use tracing::debug;

pub(super) fn dispatch_command(command: Command, ctx: &Context) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "crudlet", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Posts { command } => dispatch_posts(command, ctx),
        Command::Users { command } => dispatch_users(command, ctx),
        Command::Todos { command } => dispatch_todos(command, ctx),
        Command::Overlay { command } => dispatch_overlay(command, ctx),
        Command::Mock {
            command:
                MockCommand::Serve {
                    bind,
                    fail_reads,
                    fail_writes,
                },
        } => {
            let bind: SocketAddr = bind.parse().map_err(|_| {
                Error::new(ErrorKind::Usage)
                    .with_message("invalid bind address")
                    .with_hint("Use a host:port value like 127.0.0.1:3000.")
            })?;
            let config = mock_server::MockConfig {
                bind,
                fail_reads,
                fail_writes,
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            runtime.block_on(mock_server::serve(config))?;
            Ok(RunOutcome::ok())
        }
    }
}

fn remote_client(ctx: &Context) -> Result<RemoteClient, Error> {
    RemoteClient::new(ctx.base_url.clone()).map_err(|err| {
        err.with_hint("Pass an http(s) URL via --base-url or CRUDLET_BASE_URL.")
    })
}

fn post_sync(ctx: &Context) -> Result<PostSync, Error> {
    let remote = remote_client(ctx)?;
    debug!(
        base_url = %remote.base_url(),
        state_dir = %ctx.state_dir.display(),
        "post sync ready"
    );
    Ok(ListSync::new(remote, posts_overlay(&ctx.state_dir)).with_policy(ctx.policy))
}

fn dispatch_posts(command: PostsCommand, ctx: &Context) -> Result<RunOutcome, Error> {
    let sync = post_sync(ctx)?;
    match command {
        PostsCommand::List { output } => {
            let list = sync.load_display_list()?;
            emit_list_notices(&sync, &list, "posts list", ctx.color_mode);
            if output.json {
                let posts = list.entries.iter().map(entry_json).collect::<Vec<_>>();
                emit_json(json!({ "posts": posts }));
            } else {
                emit_post_table(&list.entries);
            }
            Ok(RunOutcome::ok())
        }
        PostsCommand::Show { id, output } => {
            let entry = sync.get_item(id)?;
            // author lookup failure does not fail the detail view
            let author = match UserDirectory::new(sync.remote().clone()).get(entry.item.user_id) {
                Ok(user) => Some(user),
                Err(err) => {
                    debug!(error = %err, "author lookup failed");
                    None
                }
            };
            if output.json {
                emit_json(json!({
                    "post": entry_json(&entry),
                    "author": author.as_ref().map(to_json),
                }));
            } else {
                emit_post_detail(&entry, author.as_ref());
            }
            Ok(RunOutcome::ok())
        }
        PostsCommand::Create {
            title,
            body,
            user_id,
            output,
        } => {
            let draft = PostDraft {
                title,
                body,
                user_id,
            };
            let created = sync.create_item(&draft)?;
            if output.json {
                emit_json(json!({ "created": to_json(&created) }));
            } else {
                println!("created post {}: {}", created.id, created.title);
            }
            Ok(RunOutcome::ok())
        }
        PostsCommand::Edit {
            id,
            title,
            body,
            user_id,
            output,
        } => {
            let patch = PostPatch {
                title,
                body,
                user_id,
            };
            let updated = sync.update_item(id, &patch)?;
            if output.json {
                emit_json(json!({ "updated": to_json(&updated) }));
            } else {
                println!("updated post {}: {}", updated.id, updated.title);
            }
            Ok(RunOutcome::ok())
        }
        PostsCommand::Delete {
            id,
            confirm,
            output,
        } => {
            ensure_confirmable(confirm.yes, "delete a post")?;
            let outcome = if confirm.yes {
                sync.delete_item(id, &AssumeYes)?
            } else {
                sync.delete_item(id, &prompt_on_tty)?
            };
            emit_delete_outcome("post", id, &outcome, true, output.json);
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_users(command: UsersCommand, ctx: &Context) -> Result<RunOutcome, Error> {
    let directory = UserDirectory::new(remote_client(ctx)?);
    match command {
        UsersCommand::List { output } => {
            let users = directory.list()?;
            if output.json {
                emit_json(json!({ "users": to_json(&users) }));
            } else {
                emit_user_table(&users);
            }
        }
        UsersCommand::Show { id, output } => {
            let user = directory.get(id)?;
            let posts = directory.posts_by(id)?;
            if output.json {
                emit_json(json!({ "user": to_json(&user), "posts": to_json(&posts) }));
            } else {
                emit_user_detail(&user, &posts);
            }
        }
    }
    Ok(RunOutcome::ok())
}

fn dispatch_todos(command: TodosCommand, ctx: &Context) -> Result<RunOutcome, Error> {
    let board = TodoBoard::new(remote_client(ctx)?);
    match command {
        TodosCommand::List { filter, output } => {
            let todos = board.list(filter.into())?;
            if output.json {
                emit_json(json!({ "todos": to_json(&todos) }));
            } else {
                emit_todo_table(&todos);
            }
        }
        TodosCommand::Add {
            title,
            user_id,
            output,
        } => {
            let todo = board.add(&TodoDraft::new(title, user_id))?;
            if output.json {
                emit_json(json!({ "created": to_json(&todo) }));
            } else {
                println!("added todo {}: {}", todo.id, todo.title);
            }
        }
        TodosCommand::Toggle {
            id,
            completed,
            output,
        } => {
            let todo = match completed {
                Some(completed) => board.toggle_completion(id, completed)?,
                None => board.flip(id)?,
            };
            if output.json {
                emit_json(json!({ "updated": to_json(&todo) }));
            } else {
                let state = if todo.completed { "completed" } else { "active" };
                println!("todo {} is now {state}", todo.id);
            }
        }
        TodosCommand::Delete {
            id,
            confirm,
            output,
        } => {
            ensure_confirmable(confirm.yes, "delete a todo")?;
            let outcome = if confirm.yes {
                board.delete(id, &AssumeYes)?
            } else {
                board.delete(id, &prompt_on_tty)?
            };
            emit_delete_outcome("todo", id, &outcome, false, output.json);
        }
    }
    Ok(RunOutcome::ok())
}

fn dispatch_overlay(command: OverlayCommand, ctx: &Context) -> Result<RunOutcome, Error> {
    let sync = post_sync(ctx)?;
    let path = sync.overlay().path().to_path_buf();
    match command {
        OverlayCommand::Show { output } => {
            let items = sync.overlay_items()?;
            if output.json {
                emit_json(json!({
                    "path": path.display().to_string(),
                    "posts": to_json(&items),
                }));
            } else if items.is_empty() {
                println!("no local posts ({})", display_path(&path));
            } else {
                let rows = items
                    .iter()
                    .map(|post| {
                        vec![
                            post.id.to_string(),
                            post.user_id.to_string(),
                            post.title.clone(),
                        ]
                    })
                    .collect::<Vec<_>>();
                emit_table(&["ID", "USER", "TITLE"], &rows);
            }
        }
        OverlayCommand::Clear { confirm, output } => {
            ensure_confirmable(confirm.yes, "clear the local overlay")?;
            if !confirm.yes && !prompt_on_tty("Remove every locally created post?") {
                emit_cancelled(output.json, json!({ "overlay": path.display().to_string() }));
                return Ok(RunOutcome::ok());
            }
            let removed = sync.clear_overlay()?;
            if output.json {
                emit_json(json!({ "cleared": removed, "path": path.display().to_string() }));
            } else {
                println!("removed {removed} local post(s)");
            }
        }
    }
    Ok(RunOutcome::ok())
}

fn emit_list_notices(
    sync: &PostSync,
    list: &DisplayList<Post>,
    cmd: &str,
    color_mode: ColorMode,
) {
    if list.overlay_recovered {
        emit_notice(
            Notice::new(
                "overlay_recovered",
                cmd,
                "local posts were unreadable and are shown as empty",
            )
            .with_resource("posts")
            .with_detail("path", sync.overlay().path().display().to_string()),
            color_mode,
        );
    }
    if list.stale {
        emit_notice(
            Notice::new("stale_list", cmd, "writes landed while listing; rerun to refresh")
                .with_resource("posts")
                .with_detail("generation", list.generation),
            color_mode,
        );
    }
}

/// `has_overlay` is false for resources without local copies; their output omits the count.
fn emit_delete_outcome(
    what: &str,
    id: u64,
    outcome: &DeleteOutcome,
    has_overlay: bool,
    json_output: bool,
) {
    match outcome {
        DeleteOutcome::Cancelled => emit_cancelled(json_output, json!({ "id": id })),
        DeleteOutcome::Deleted { overlay_removed } => {
            if json_output {
                let mut deleted = json!({ "id": id });
                if has_overlay {
                    deleted["overlay_removed"] = json!(overlay_removed);
                }
                emit_json(json!({ "deleted": deleted }));
            } else if *overlay_removed > 0 {
                println!("deleted {what} {id} (and {overlay_removed} local copy/copies)");
            } else {
                println!("deleted {what} {id}");
            }
        }
    }
}

fn emit_cancelled(json_output: bool, target: Value) {
    if json_output {
        emit_json(json!({ "cancelled": target }));
    } else {
        eprintln!("cancelled");
    }
}
