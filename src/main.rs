//! Purpose: `crudlet` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits output on stdout.
//! Invariants: Commands emit human tables or JSON (`--json`); diagnostics go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All post writes go through `api::ListSync` (validation + overlay ordering).
#![allow(clippy::result_large_err)]
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod mock_server;

use crudlet::api::{
    DEFAULT_BASE_URL, DuplicatePolicy, Entry, Error, ErrorKind, Post, StatusFilter, Todo, User,
    to_exit_code,
};
use crudlet::notice::{Notice, notice_json};
use crudlet::state_paths::default_state_dir;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let default_filter = match cli.command {
        Command::Mock { .. } => "info",
        _ => "warn",
    };
    init_tracing(default_filter);

    let color_mode = cli.color;
    let ctx = Context {
        base_url: cli.base_url,
        state_dir: cli.state_dir.unwrap_or_else(default_state_dir),
        policy: cli.duplicates.into(),
        color_mode,
    };

    command_dispatch::dispatch_command(cli.command, &ctx)
        .map_err(add_fetch_hint)
        .map_err(add_write_hint)
        .map_err(add_corrupt_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Resolved global options shared by every command.
struct Context {
    base_url: String,
    state_dir: PathBuf,
    policy: DuplicatePolicy,
    color_mode: ColorMode,
}

#[derive(Parser)]
#[command(
    name = "crudlet",
    version,
    about = "CRUD client for a JSONPlaceholder-style API with a local overlay",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"The remote service does not persist writes. Posts you create are kept in a
local overlay and shown ahead of the remote list.

Mental model:
  - `posts list` merges local and remote posts
  - `posts create` writes remotely, then records the result locally
  - `overlay show|clear` inspects or resets the local overlay
"#,
    after_help = r#"EXAMPLES
  $ crudlet posts list
  $ crudlet posts create --title "New Post Title" --body "1234567890" --user-id 2
  $ crudlet todos list --filter active
  $ crudlet mock serve --bind 127.0.0.1:3000   # offline stand-in
  $ crudlet --base-url http://127.0.0.1:3000 posts list

LEARN MORE
  $ crudlet <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        env = "CRUDLET_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        help = "Base URL of the remote service",
        value_hint = ValueHint::Url
    )]
    base_url: String,
    #[arg(
        long,
        env = "CRUDLET_STATE_DIR",
        help = "Directory holding the local overlay (default: ~/.crudlet)",
        value_hint = ValueHint::DirPath
    )]
    state_dir: Option<PathBuf>,
    #[arg(
        long,
        default_value = "prefer-overlay",
        value_enum,
        help = "How to show a post present both locally and remotely"
    )]
    duplicates: DuplicatesCli,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr labels (error/hint/notice): auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DuplicatesCli {
    KeepBoth,
    PreferOverlay,
    PreferRemote,
}

impl From<DuplicatesCli> for DuplicatePolicy {
    fn from(value: DuplicatesCli) -> Self {
        match value {
            DuplicatesCli::KeepBoth => DuplicatePolicy::KeepBoth,
            DuplicatesCli::PreferOverlay => DuplicatePolicy::PreferOverlay,
            DuplicatesCli::PreferRemote => DuplicatePolicy::PreferRemote,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FilterCli {
    All,
    Active,
    Completed,
}

impl From<FilterCli> for StatusFilter {
    fn from(value: FilterCli) -> Self {
        match value {
            FilterCli::All => StatusFilter::All,
            FilterCli::Active => StatusFilter::Active,
            FilterCli::Completed => StatusFilter::Completed,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "List, show, create, edit, and delete posts")]
    Posts {
        #[command(subcommand)]
        command: PostsCommand,
    },
    #[command(about = "Browse users (read-only)")]
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    #[command(about = "List, add, toggle, and delete todos")]
    Todos {
        #[command(subcommand)]
        command: TodosCommand,
    },
    #[command(about = "Inspect or clear locally created posts")]
    Overlay {
        #[command(subcommand)]
        command: OverlayCommand,
    },
    #[command(about = "Run a local stand-in for the remote service")]
    Mock {
        #[command(subcommand)]
        command: MockCommand,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

#[derive(Args, Clone, Copy, Debug)]
struct OutputArgs {
    #[arg(long, help = "Emit JSON instead of a table")]
    json: bool,
}

#[derive(Args, Clone, Copy, Debug)]
struct ConfirmArgs {
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    yes: bool,
}

#[derive(Subcommand)]
enum PostsCommand {
    #[command(about = "List local and remote posts, newest local first")]
    List {
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Show one post with its author")]
    Show {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Create a post (validated before sending)")]
    Create {
        #[arg(long, help = "Title (5-100 characters)")]
        title: String,
        #[arg(long, help = "Body (at least 10 characters)")]
        body: String,
        #[arg(long, allow_negative_numbers = true, help = "Author user id (positive)")]
        user_id: i64,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Edit fields of an existing post")]
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        user_id: Option<i64>,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Delete a post remotely and from the local overlay")]
    Delete {
        id: u64,
        #[command(flatten)]
        confirm: ConfirmArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
enum UsersCommand {
    #[command(about = "List users")]
    List {
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Show one user and their posts")]
    Show {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
enum TodosCommand {
    #[command(about = "List todos")]
    List {
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterCli,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Add a todo (starts active)")]
    Add {
        #[arg(long, help = "Title (3-100 characters)")]
        title: String,
        #[arg(long, allow_negative_numbers = true, default_value_t = 1)]
        user_id: i64,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Flip a todo's completion, or set it with --completed")]
    Toggle {
        id: u64,
        #[arg(long)]
        completed: Option<bool>,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Delete a todo")]
    Delete {
        id: u64,
        #[command(flatten)]
        confirm: ConfirmArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
enum OverlayCommand {
    #[command(about = "Show locally created posts")]
    Show {
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Remove every locally created post")]
    Clear {
        #[command(flatten)]
        confirm: ConfirmArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
enum MockCommand {
    #[command(about = "Serve seeded posts, users, and todos over HTTP")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,
        #[arg(long, value_name = "STATUS", help = "Answer every read with this HTTP status")]
        fail_reads: Option<u16>,
        #[arg(long, value_name = "STATUS", help = "Answer every write with this HTTP status")]
        fail_writes: Option<u16>,
    },
}

fn add_fetch_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::RemoteFetch || err.hint().is_some() {
        return err;
    }
    err.with_hint("Could not load data. Check connectivity and --base-url, then retry.")
}

fn add_write_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::RemoteWrite || err.hint().is_some() {
        return err;
    }
    err.with_hint("The remote rejected the change; nothing was saved locally. Retry the command.")
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("I/O error. Check --state-dir permissions and disk space.")
}

fn add_corrupt_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Corrupt || err.hint().is_some() {
        return err;
    }
    err.with_hint("Local overlay is unreadable. Reset it with `crudlet overlay clear`.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and report it if it persists.",
    )
}

/// Fails unless the user can be prompted or has passed `--yes`.
fn ensure_confirmable(yes: bool, action: &str) -> Result<(), Error> {
    if yes || io::stdin().is_terminal() {
        return Ok(());
    }
    Err(Error::new(ErrorKind::Usage)
        .with_message(format!("refusing to {action} without confirmation"))
        .with_hint("Pass --yes to confirm from a script or pipe."))
}

fn prompt_on_tty(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("crudlet {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "crudlet",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn entry_json(entry: &Entry<Post>) -> Value {
    let mut value = to_json(&entry.item);
    if let Value::Object(map) = &mut value {
        map.insert("origin".to_string(), json!(entry.origin.as_str()));
    }
    value
}

fn emit_post_table(entries: &[Entry<Post>]) {
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.item.id.to_string(),
                entry.item.user_id.to_string(),
                entry.origin.as_str().to_string(),
                entry.item.title.clone(),
            ]
        })
        .collect::<Vec<_>>();
    emit_table(&["ID", "USER", "ORIGIN", "TITLE"], &rows);
}

fn emit_post_detail(entry: &Entry<Post>, author: Option<&User>) {
    let post = &entry.item;
    println!("#{} {}", post.id, post.title);
    match author {
        Some(user) => println!("by {} (@{}, user {})", user.name, user.username, post.user_id),
        None => println!("by user {} (author unavailable)", post.user_id),
    }
    println!("origin: {}", entry.origin.as_str());
    println!();
    println!("{}", post.body);
}

fn emit_todo_table(todos: &[Todo]) {
    let rows = todos
        .iter()
        .map(|todo| {
            vec![
                todo.id.to_string(),
                todo.user_id.to_string(),
                if todo.completed { "[x]" } else { "[ ]" }.to_string(),
                todo.title.clone(),
            ]
        })
        .collect::<Vec<_>>();
    emit_table(&["ID", "USER", "DONE", "TITLE"], &rows);
}

fn emit_user_table(users: &[User]) {
    let rows = users
        .iter()
        .map(|user| {
            vec![
                user.id.to_string(),
                user.username.clone(),
                user.name.clone(),
                user.email.clone(),
            ]
        })
        .collect::<Vec<_>>();
    emit_table(&["ID", "USERNAME", "NAME", "EMAIL"], &rows);
}

fn emit_user_detail(user: &User, posts: &[Post]) {
    println!("{} (@{})", user.name, user.username);
    println!("email: {}", user.email);
    if !user.phone.is_empty() {
        println!("phone: {}", user.phone);
    }
    if !user.website.is_empty() {
        println!("website: {}", user.website);
    }
    if !user.address.city.is_empty() {
        println!("city: {}", user.address.city);
    }
    if !user.company.name.is_empty() {
        println!("company: {}", user.company.name);
    }
    println!();
    let rows = posts
        .iter()
        .map(|post| vec![post.id.to_string(), post.title.clone()])
        .collect::<Vec<_>>();
    emit_table(&["POST", "TITLE"], &rows);
}

fn emit_table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", render_table(headers, rows));
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();
    let cleaned_rows = rows
        .iter()
        .map(|row| {
            widths
                .iter_mut()
                .enumerate()
                .map(|(idx, width)| {
                    let cell = row.get(idx).map(String::as_str).unwrap_or("");
                    let cell = cell.replace('\n', "\\n").replace('\r', "\\r");
                    *width = (*width).max(cell.chars().count());
                    cell
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    std::iter::once(&header_cells)
        .chain(cleaned_rows.iter())
        .map(|cells| format_table_line(cells, &widths))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        let cell_len = cell.chars().count();
        // no trailing pad on the last column
        if idx + 1 < widths.len() && *width > cell_len {
            line.push_str(&" ".repeat(*width - cell_len));
        }
    }
    line
}

fn emit_json(value: Value) {
    let pretty = io::stdout().is_terminal();
    let json = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: Notice, color_mode: ColorMode) {
    let notice = notice.with_time(notice_time_now().unwrap_or_default());
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        match &notice.resource {
            Some(resource) => eprintln!("{label} {} ({resource})", notice.message),
            None => eprintln!("{label} {}", notice.message),
        }
        return;
    }

    let value = notice_json(&notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Validation => "invalid input".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::RemoteFetch => "failed to load from remote".to_string(),
        ErrorKind::RemoteWrite => "remote write failed".to_string(),
        ErrorKind::Corrupt => "corrupt data".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(resource) = err.resource() {
        inner.insert("resource".to_string(), json!(resource.segment()));
    }
    if let Some(id) = err.id() {
        inner.insert("id".to_string(), json!(id));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if !err.issues().is_empty() {
        let issues = err
            .issues()
            .iter()
            .map(|issue| json!({ "field": issue.field, "message": issue.message }))
            .collect::<Vec<_>>();
        inner.insert("issues".to_string(), json!(issues));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));
    for issue in err.issues() {
        lines.push(format!("  {}: {}", issue.field, issue.message));
    }

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            display_path(path)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn display_path(path: &Path) -> String {
    let Some(home) = std::env::var_os("HOME").filter(|home| !home.is_empty()) else {
        return path.display().to_string();
    };
    match path.strip_prefix(Path::new(&home)) {
        Ok(relative) => format!("~/{}", relative.display()),
        Err(_) => path.display().to_string(),
    }
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `crudlet --help`.".to_string();
    };
    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "crudlet") else {
        return "Try `crudlet --help`.".to_string();
    };

    let parts = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect::<Vec<_>>();
    if parts.is_empty() {
        return "Try `crudlet --help`.".to_string();
    }
    format!("Try `crudlet {} --help`.", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Command, PostsCommand, add_write_hint, error_json, error_text, render_table,
    };
    use clap::Parser;
    use crudlet::api::{Error, ErrorKind, FieldIssue, Resource};

    #[test]
    fn render_table_aligns_columns() {
        let table = render_table(
            &["ID", "TITLE"],
            &[
                vec!["1".to_string(), "Hello World".to_string()],
                vec!["101".to_string(), "multi\nline".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID   TITLE");
        assert_eq!(lines[1], "1    Hello World");
        assert_eq!(lines[2], "101  multi\\nline");
    }

    #[test]
    fn error_json_carries_field_issues() {
        let err = Error::validation(vec![FieldIssue::new(
            "title",
            "Title must be at least 5 characters",
        )]);
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Validation");
        assert_eq!(value["error"]["issues"][0]["field"], "title");
    }

    #[test]
    fn error_text_lists_issues_and_hint() {
        let err = Error::new(ErrorKind::RemoteWrite)
            .with_status(500)
            .with_resource(Resource::Posts);
        let err = add_write_hint(err);
        let text = error_text(&err, false);
        assert!(text.starts_with("error: remote write failed"));
        assert!(text.contains("hint: The remote rejected the change"));
        let json = error_json(&err);
        assert_eq!(json["error"]["status"], 500);
        assert_eq!(json["error"]["resource"], "posts");
    }

    #[test]
    fn negative_user_id_reaches_validation() {
        let cli = Cli::try_parse_from([
            "crudlet",
            "posts",
            "create",
            "--title",
            "New Post Title",
            "--body",
            "1234567890",
            "--user-id",
            "-1",
        ])
        .expect("parse");
        match cli.command {
            Command::Posts {
                command: PostsCommand::Create { user_id, .. },
            } => assert_eq!(user_id, -1),
            _ => panic!("expected posts create"),
        }
    }
}
