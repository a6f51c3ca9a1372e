//! Purpose: Single error type shared by the library, the CLI, and the mock server.
//! Exports: `Error`, `ErrorKind`, `FieldIssue`, `to_exit_code`.
//! Role: Builder-style error carrying optional remote/overlay context.
//! Invariants: `Validation` errors always carry at least one field issue.
//! Invariants: Exit code mapping is stable once published.
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use super::record::Resource;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Validation,
    NotFound,
    RemoteFetch,
    RemoteWrite,
    Corrupt,
    Io,
}

/// One violated constraint on one draft field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    resource: Option<Resource>,
    id: Option<u64>,
    status: Option<u16>,
    path: Option<PathBuf>,
    issues: Vec<FieldIssue>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            resource: None,
            id: None,
            status: None,
            path: None,
            issues: Vec::new(),
            source: None,
        }
    }

    pub fn validation(issues: Vec<FieldIssue>) -> Self {
        let message = match issues.len() {
            1 => "1 field is invalid".to_string(),
            count => format!("{count} fields are invalid"),
        };
        Self::new(ErrorKind::Validation)
            .with_message(message)
            .with_issues(issues)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn resource(&self) -> Option<Resource> {
        self.resource
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// HTTP status of the remote response, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_issues(mut self, issues: Vec<FieldIssue>) -> Self {
        self.issues = issues;
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Re-tags a failure with a different kind, keeping all context.
    pub(crate) fn into_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(resource) = self.resource {
            write!(f, " (resource: {})", resource.segment())?;
        }
        if let Some(id) = self.id {
            write!(f, " (id: {id})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        for issue in &self.issues {
            write!(f, " [{}: {}]", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Validation => 4,
        ErrorKind::RemoteFetch => 5,
        ErrorKind::RemoteWrite => 6,
        ErrorKind::Corrupt => 7,
        ErrorKind::Io => 8,
    }
}
