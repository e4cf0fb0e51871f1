//! Remote users API contract.
//!
//! # Responsibility
//! - Define the CRUD calls the sync layer issues against the backend.
//! - Classify failures into one network error taxonomy.
//!
//! # Invariants
//! - Any non-2xx status is a failure, whatever the body says.
//! - Calls are never retried at this layer.

use crate::model::record::{Record, RecordKey};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod http;

pub use http::HttpUsersApi;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote call being performed, used for error context and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    FetchAll,
    Create,
    Delete,
}

impl RemoteOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchAll => "fetch_all",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl Display for RemoteOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network-level failure of one remote operation.
#[derive(Debug)]
pub enum RemoteError {
    /// Server answered with a non-success status.
    Status {
        operation: RemoteOperation,
        status: u16,
    },
    /// Request never produced a response (connect, TLS, IO).
    Transport {
        operation: RemoteOperation,
        source: reqwest::Error,
    },
    /// Success status, but the body is not the expected JSON shape.
    Decode {
        operation: RemoteOperation,
        message: String,
    },
    /// Endpoint URL could not be built from the configured base.
    InvalidUrl(String),
    /// HTTP client could not be constructed.
    ClientInit(reqwest::Error),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { operation, status } => {
                write!(f, "{operation} failed with status {status}")
            }
            Self::Transport { operation, source } => {
                write!(f, "{operation} transport error: {source}")
            }
            Self::Decode { operation, message } => {
                write!(f, "{operation} returned an invalid body: {message}")
            }
            Self::InvalidUrl(message) => write!(f, "invalid api url: {message}"),
            Self::ClientInit(source) => write!(f, "http client init failed: {source}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport { source, .. } | Self::ClientInit(source) => Some(source),
            _ => None,
        }
    }
}

/// Backend CRUD calls over user records.
pub trait UsersApi {
    /// `GET /api/users`.
    fn fetch_all(&self) -> RemoteResult<Vec<Record>>;
    /// `POST /api/users`; returns the record as stored by the server.
    fn create(&self, record: &Record) -> RemoteResult<Record>;
    /// `DELETE /api/users/{key}`; the response body is ignored.
    fn delete(&self, key: &RecordKey) -> RemoteResult<()>;
}

impl<A: UsersApi + ?Sized> UsersApi for &A {
    fn fetch_all(&self) -> RemoteResult<Vec<Record>> {
        (**self).fetch_all()
    }

    fn create(&self, record: &Record) -> RemoteResult<Record> {
        (**self).create(record)
    }

    fn delete(&self, key: &RecordKey) -> RemoteResult<()> {
        (**self).delete(key)
    }
}
