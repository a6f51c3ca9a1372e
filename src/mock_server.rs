//! Purpose: Provide a local JSONPlaceholder-compatible HTTP/JSON server.
//! Exports: `MockConfig`, `serve`.
//! Role: Axum-based loopback stand-in for the remote service (demos, integration tests).
//! Invariants: Seed data is deterministic: 10 users, 100 posts, 200 todos.
//! Invariants: Writes are acknowledged but never persisted; new ids are `len + 1`.
//! Invariants: Injected failures use the `{"error":{"message":..}}` envelope.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

use crudlet::api::{Error, ErrorKind, Resource};

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub bind: SocketAddr,
    pub fail_reads: Option<u16>,
    pub fail_writes: Option<u16>,
}

struct AppState {
    fixtures: Fixtures,
    fail_reads: Option<StatusCode>,
    fail_writes: Option<StatusCode>,
}

struct Fixtures {
    posts: Vec<Value>,
    users: Vec<Value>,
    todos: Vec<Value>,
}

impl Fixtures {
    fn collection(&self, resource: Resource) -> &[Value] {
        match resource {
            Resource::Posts => &self.posts,
            Resource::Users => &self.users,
            Resource::Todos => &self.todos,
        }
    }
}

pub async fn serve(config: MockConfig) -> Result<(), Error> {
    let state = Arc::new(AppState {
        fixtures: seed_fixtures(),
        fail_reads: failure_status(config.fail_reads, "--fail-reads")?,
        fail_writes: failure_status(config.fail_writes, "--fail-writes")?,
    });

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/:resource", get(list_items).post(create_item))
        .route(
            "/:resource/:id",
            get(get_item)
                .put(update_item)
                .patch(update_item)
                .delete(delete_item),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to bind mock server")
                .with_source(err)
        })?;
    info!(bind = %config.bind, "mock server listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("mock server failed")
                    .with_source(err)
            })?;
        }
        _ = shutdown_signal() => {
            let _ = shutdown_tx.send(());
            match tokio::time::timeout(Duration::from_secs(5), &mut server).await {
                Ok(result) => result.map_err(|err| {
                    Error::new(ErrorKind::Io)
                        .with_message("mock server failed")
                        .with_source(err)
                })?,
                Err(_) => {
                    return Err(
                        Error::new(ErrorKind::Io).with_message("mock server shutdown timed out")
                    );
                }
            }
        }
    };
    Ok(())
}

fn failure_status(status: Option<u16>, flag: &str) -> Result<Option<StatusCode>, Error> {
    status
        .map(|code| {
            StatusCode::from_u16(code)
                .ok()
                .filter(|status| status.is_client_error() || status.is_server_error())
                .ok_or_else(|| {
                    Error::new(ErrorKind::Usage)
                        .with_message(format!("{flag} must be an HTTP error status (400-599)"))
                })
        })
        .transpose()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "userId")]
    user_id: Option<u64>,
}

async fn healthz() -> Response {
    Json(json!({ "ok": true })).into_response()
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    AxumPath(resource): AxumPath<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let resource = match parse_resource(&resource) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    if let Some(status) = state.fail_reads {
        return injected(status);
    }
    let items: Vec<&Value> = state
        .fixtures
        .collection(resource)
        .iter()
        .filter(|item| match query.user_id {
            Some(user_id) => item["userId"] == json!(user_id),
            None => true,
        })
        .collect();
    Json(json!(items)).into_response()
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    AxumPath((resource, id)): AxumPath<(String, u64)>,
) -> Response {
    let resource = match parse_resource(&resource) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    if let Some(status) = state.fail_reads {
        return injected(status);
    }
    match find(&state.fixtures, resource, id) {
        Some(item) => Json(item.clone()).into_response(),
        None => empty_not_found(),
    }
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    AxumPath(resource): AxumPath<String>,
    Json(body): Json<Value>,
) -> Response {
    let resource = match writable_resource(&resource) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    if let Some(status) = state.fail_writes {
        return injected(status);
    }
    let Value::Object(mut fields) = body else {
        return error_envelope(StatusCode::BAD_REQUEST, "request body must be a JSON object");
    };
    let id = state.fixtures.collection(resource).len() + 1;
    fields.insert("id".to_string(), json!(id));
    (StatusCode::CREATED, Json(Value::Object(fields))).into_response()
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    AxumPath((resource, id)): AxumPath<(String, u64)>,
    Json(body): Json<Value>,
) -> Response {
    let resource = match writable_resource(&resource) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    if let Some(status) = state.fail_writes {
        return injected(status);
    }
    let Value::Object(changes) = body else {
        return error_envelope(StatusCode::BAD_REQUEST, "request body must be a JSON object");
    };
    let Some(Value::Object(current)) = find(&state.fixtures, resource, id) else {
        return empty_not_found();
    };
    let mut merged: Map<String, Value> = current.clone();
    for (key, value) in changes {
        if key != "id" {
            merged.insert(key, value);
        }
    }
    Json(Value::Object(merged)).into_response()
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    AxumPath((resource, _id)): AxumPath<(String, u64)>,
) -> Response {
    if let Err(response) = writable_resource(&resource) {
        return response;
    }
    if let Some(status) = state.fail_writes {
        return injected(status);
    }
    Json(json!({})).into_response()
}

fn parse_resource(segment: &str) -> Result<Resource, Response> {
    match segment {
        "posts" => Ok(Resource::Posts),
        "users" => Ok(Resource::Users),
        "todos" => Ok(Resource::Todos),
        _ => Err(empty_not_found()),
    }
}

fn writable_resource(segment: &str) -> Result<Resource, Response> {
    match parse_resource(segment)? {
        Resource::Users => Err(error_envelope(
            StatusCode::METHOD_NOT_ALLOWED,
            "users are read-only",
        )),
        resource => Ok(resource),
    }
}

fn find(fixtures: &Fixtures, resource: Resource, id: u64) -> Option<&Value> {
    fixtures
        .collection(resource)
        .iter()
        .find(|item| item["id"] == json!(id))
}

// JSONPlaceholder answers unknown ids with an empty object and a 404.
fn empty_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
}

fn injected(status: StatusCode) -> Response {
    error_envelope(status, "injected failure")
}

fn error_envelope(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": { "message": message } }))).into_response()
}

const USERS: [(&str, &str, &str, &str); 10] = [
    ("Leanne Graham", "Bret", "Sincere@april.biz", "Gwenborough"),
    ("Ervin Howell", "Antonette", "Shanna@melissa.tv", "Wisokyburgh"),
    ("Clementine Bauch", "Samantha", "Nathan@yesenia.net", "McKenziehaven"),
    ("Patricia Lebsack", "Karianne", "Julianne.OConner@kory.org", "South Elvis"),
    ("Chelsey Dietrich", "Kamren", "Lucio_Hettinger@annie.ca", "Roscoeview"),
    ("Mrs. Dennis Schulist", "Leopoldo_Corkery", "Karley_Dach@jasper.info", "South Christy"),
    ("Kurtis Weissnat", "Elwyn.Skiles", "Telly.Hoeger@billy.biz", "Howemouth"),
    ("Nicholas Runolfsdottir V", "Maxime_Nienow", "Sherwood@rosamond.me", "Aliyaview"),
    ("Glenna Reichert", "Delphine", "Chaim_McDermott@dana.io", "Bartholomebury"),
    ("Clementina DuBuque", "Moriah.Stanton", "Rey.Padberg@karina.biz", "Lebsackbury"),
];

const WORDS: [&str; 16] = [
    "sunt", "aut", "facere", "repellat", "provident", "occaecati", "excepturi", "optio",
    "reprehenderit", "qui", "est", "esse", "dolorem", "eum", "magnam", "nesciunt",
];

fn phrase(seed: u64, len: usize) -> String {
    (0..len as u64)
        .map(|n| WORDS[((seed * 7 + n * 5) % WORDS.len() as u64) as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

fn seed_fixtures() -> Fixtures {
    let users = USERS
        .iter()
        .zip(1u64..)
        .map(|((name, username, email, city), id)| {
            json!({
                "id": id,
                "name": name,
                "username": username,
                "email": email,
                "phone": format!("1-770-736-80{id:02}"),
                "website": format!("{}.example.org", username.to_lowercase()),
                "address": {
                    "street": format!("{id} Kulas Light"),
                    "suite": format!("Apt. {}", 500 + id),
                    "city": city,
                    "zipcode": format!("92998-38{id:02}"),
                    "geo": { "lat": "-37.3159", "lng": "81.1496" },
                },
                "company": {
                    "name": format!("{} Group", name.split_whitespace().last().unwrap_or(name)),
                    "catchPhrase": phrase(id, 4),
                    "bs": phrase(id + 3, 3),
                },
            })
        })
        .collect();
    let posts = (1..=100u64)
        .map(|id| {
            json!({
                "userId": (id - 1) / 10 + 1,
                "id": id,
                "title": phrase(id, 5),
                "body": phrase(id + 11, 12),
            })
        })
        .collect();
    let todos = (1..=200u64)
        .map(|id| {
            json!({
                "userId": (id - 1) / 20 + 1,
                "id": id,
                "title": phrase(id + 29, 4),
                "completed": (id * 7) % 3 == 0,
            })
        })
        .collect();
    Fixtures { posts, users, todos }
}

#[cfg(test)]
mod tests {
    use super::{Fixtures, failure_status, seed_fixtures};
    use crudlet::api::{ErrorKind, Post, Resource, Todo, User};

    fn decode<T: serde::de::DeserializeOwned>(fixtures: &Fixtures, resource: Resource) -> Vec<T> {
        fixtures
            .collection(resource)
            .iter()
            .map(|value| serde_json::from_value(value.clone()).expect("decode"))
            .collect()
    }

    #[test]
    fn seed_sizes_match_jsonplaceholder() {
        let fixtures = seed_fixtures();
        let users: Vec<User> = decode(&fixtures, Resource::Users);
        let posts: Vec<Post> = decode(&fixtures, Resource::Posts);
        let todos: Vec<Todo> = decode(&fixtures, Resource::Todos);
        assert_eq!(users.len(), 10);
        assert_eq!(posts.len(), 100);
        assert_eq!(todos.len(), 200);
        assert_eq!(users[0].username, "Bret");
        assert!(posts.iter().all(|post| (1..=10).contains(&post.user_id)));
        assert!(todos.iter().any(|todo| todo.completed));
        assert!(todos.iter().any(|todo| !todo.completed));
    }

    #[test]
    fn seed_is_deterministic() {
        assert_eq!(seed_fixtures().posts, seed_fixtures().posts);
    }

    #[test]
    fn failure_status_must_be_an_error_code() {
        assert!(failure_status(Some(503), "--fail-reads").is_ok_and(|s| s.is_some()));
        assert!(failure_status(None, "--fail-reads").is_ok_and(|s| s.is_none()));
        let err = failure_status(Some(200), "--fail-reads").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
