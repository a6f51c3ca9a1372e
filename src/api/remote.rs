//! Purpose: HTTP/JSON client for a JSONPlaceholder-style REST service.
//! Exports: `RemoteClient`, `ResourceService`, `DEFAULT_BASE_URL`.
//! Role: Passthrough transport for list/get/create/update/delete per resource.
//! Invariants: Read failures map to `RemoteFetch`; write failures map to `RemoteWrite`.
//! Invariants: `get` maps a 404 to `NotFound`; every other non-2xx keeps its status.
//! Invariants: No timeouts or retries are added on top of the transport defaults.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use crate::core::record::{Record, Resource, Writable};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

type ApiResult<T> = Result<T, Error>;

/// The remote resource collection seam. Implemented by `RemoteClient`; tests substitute fakes.
pub trait ResourceService: Send + Sync {
    fn list<T: Record>(&self) -> ApiResult<Vec<T>>;

    fn get<T: Record>(&self, id: u64) -> ApiResult<T>;

    fn create<T: Writable>(&self, draft: &T::Draft) -> ApiResult<T>;

    fn update<T: Writable>(&self, id: u64, patch: &T::Patch) -> ApiResult<T>;

    fn delete<T: Writable>(&self, id: u64) -> ApiResult<()>;
}

#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    base_url: Url,
    agent: ureq::Agent,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Op {
    Fetch,
    Write,
}

impl Op {
    fn kind(self) -> ErrorKind {
        match self {
            Op::Fetch => ErrorKind::RemoteFetch,
            Op::Write => ErrorKind::RemoteWrite,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: RemoteError,
}

#[derive(Deserialize)]
struct RemoteError {
    message: Option<String>,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self {
            inner: Arc::new(RemoteClientInner { base_url, agent }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn request_json<B, R>(&self, op: Op, method: &str, url: &Url, body: Option<&B>) -> ApiResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let response = self.send(op, method, url, body)?;
        read_json_response(op, response)
    }

    fn send<B>(
        &self,
        op: Op,
        method: &str,
        url: &Url,
        body: Option<&B>,
    ) -> ApiResult<ureq::Response>
    where
        B: Serialize,
    {
        debug!(method, url = %url, "remote request");
        let request = self
            .inner
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        let response = match body {
            None => request.call(),
            Some(body) => {
                let payload = serde_json::to_string(body).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode request json")
                        .with_source(err)
                })?;
                request
                    .set("Content-Type", "application/json; charset=UTF-8")
                    .send_string(&payload)
            }
        };

        match response {
            Ok(resp) => Ok(resp),
            Err(ureq::Error::Status(code, resp)) => Err(parse_error_response(op, code, resp)),
            Err(ureq::Error::Transport(err)) => Err(Error::new(op.kind())
                .with_message("request failed")
                .with_source(err)),
        }
    }

    fn url_for(&self, resource: Resource, id: Option<u64>) -> ApiResult<Url> {
        match id {
            Some(id) => build_url(&self.inner.base_url, &[resource.segment(), &id.to_string()]),
            None => build_url(&self.inner.base_url, &[resource.segment()]),
        }
    }
}

impl ResourceService for RemoteClient {
    fn list<T: Record>(&self) -> ApiResult<Vec<T>> {
        let url = self.url_for(T::RESOURCE, None)?;
        self.request_json::<(), _>(Op::Fetch, "GET", &url, None)
            .map_err(|err| {
                err.with_resource(T::RESOURCE)
                    .with_hint("Check connectivity and retry.")
            })
    }

    fn get<T: Record>(&self, id: u64) -> ApiResult<T> {
        let url = self.url_for(T::RESOURCE, Some(id))?;
        self.request_json::<(), _>(Op::Fetch, "GET", &url, None)
            .map_err(|err| {
                let err = if err.status() == Some(404) {
                    err.into_kind(ErrorKind::NotFound)
                        .with_message(format!("{} {id} not found", T::RESOURCE.singular()))
                } else {
                    err
                };
                err.with_resource(T::RESOURCE).with_id(id)
            })
    }

    fn create<T: Writable>(&self, draft: &T::Draft) -> ApiResult<T> {
        let url = self.url_for(T::RESOURCE, None)?;
        self.request_json(Op::Write, "POST", &url, Some(draft))
            .map_err(|err| err.with_resource(T::RESOURCE))
    }

    fn update<T: Writable>(&self, id: u64, patch: &T::Patch) -> ApiResult<T> {
        let url = self.url_for(T::RESOURCE, Some(id))?;
        self.request_json(Op::Write, "PATCH", &url, Some(patch))
            .map_err(|err| err.with_resource(T::RESOURCE).with_id(id))
    }

    fn delete<T: Writable>(&self, id: u64) -> ApiResult<()> {
        let url = self.url_for(T::RESOURCE, Some(id))?;
        self.send::<()>(Op::Write, "DELETE", &url, None)
            .map(|_response| ())
            .map_err(|err| err.with_resource(T::RESOURCE).with_id(id))
    }
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid remote base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("remote base url must use http or https scheme"));
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Usage).with_message("remote base url cannot be a base"));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message("remote base url cannot be a base")
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

fn read_json_response<R>(op: Op, response: ureq::Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let status = response.status();
    let body = response.into_string().map_err(|err| {
        Error::new(op.kind())
            .with_message("failed to read response body")
            .with_status(status)
            .with_source(err)
    })?;
    serde_json::from_str(&body).map_err(|err| {
        Error::new(op.kind())
            .with_message("invalid response json")
            .with_status(status)
            .with_source(err)
    })
}

fn parse_error_response(op: Op, status: u16, response: ureq::Response) -> Error {
    let body = response.into_string().unwrap_or_default();
    let detail = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error.message);
    let message = match detail {
        Some(detail) => format!("remote error status {status}: {detail}"),
        None => format!("remote error status {status}"),
    };
    Error::new(op.kind()).with_message(message).with_status(status)
}
