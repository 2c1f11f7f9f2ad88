//! Error types for termgraph-store.
//!
//! [`StoreError`] covers the remote protocol, snapshot files and the save
//! format. Shape problems found while reading JSON are reported as
//! [`DeserializationError`] so that a malformed document never turns into a
//! half-filled record.

use std::fmt;

use termgraph_core::CoreError;
use thiserror::Error;

/// A step of the transaction protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Begin,
    Get,
    Add,
    Delete,
    Commit,
    Rollback,
}

impl Action {
    /// Value of the `action` query parameter, for the steps that carry one.
    pub fn as_query(self) -> Option<&'static str> {
        match self {
            Action::Get => Some("GET"),
            Action::Add => Some("ADD"),
            Action::Delete => Some("DELETE"),
            Action::Commit => Some("COMMIT"),
            Action::Begin | Action::Rollback => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Begin => "BEGIN",
            Action::Get => "GET",
            Action::Add => "ADD",
            Action::Delete => "DELETE",
            Action::Commit => "COMMIT",
            Action::Rollback => "ROLLBACK",
        };
        f.write_str(name)
    }
}

/// A JSON document did not have the expected shape.
#[derive(Debug, Error)]
pub enum DeserializationError {
    /// The text is not JSON at all.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A value had the wrong JSON type.
    #[error("expected {expected} at {path}")]
    Shape { path: String, expected: &'static str },

    /// A type discriminator was not one of the known tags.
    #[error("unknown {kind} tag '{tag}' at {path}")]
    UnknownTag {
        kind: &'static str,
        tag: String,
        path: String,
    },

    /// A field held a value outside its domain.
    #[error("invalid value at {path}: {reason}")]
    InvalidValue { path: String, reason: String },
}

/// Errors produced by termgraph-store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The HTTP request could not be sent or its response not read.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint or transaction URL could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Opening a transaction returned no `Location` header.
    #[error("transaction response carried no Location header")]
    MissingLocation,

    /// A protocol step returned a non-2xx status.
    #[error("{action} step failed with status {status}")]
    StepFailed { action: Action, status: u16 },

    /// JSON serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading or writing a snapshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the failure came from the network or the file system rather
    /// than from the data itself.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            StoreError::Http(_)
                | StoreError::InvalidUrl { .. }
                | StoreError::MissingLocation
                | StoreError::StepFailed { .. }
                | StoreError::Io(_)
        )
    }
}
