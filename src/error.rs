//! Error taxonomy shared by the parsing, export and remote-service layers.

use reqwest::StatusCode;

/// Failures while turning raw text into rows.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The input could not be tokenized at all (no header, bad encoding).
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    /// Two columns share the same header name.
    #[error("duplicate header `{name}` in columns {first} and {second}")]
    DuplicateHeader {
        name: String,
        first: usize,
        second: usize,
    },
}

impl TableError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        TableError::MalformedInput {
            reason: reason.into(),
        }
    }
}

/// Failures while rasterizing a view.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("no view registered under `{view}`")]
    RegionNotFound { view: String },

    #[error("rendering failed: {reason}")]
    RenderFailed { reason: String },
}

/// Coarse classification of a [`RemoteServiceError`], so callers can tell
/// "offline" apart from "service rejected the request".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    Unreachable,
    Rejected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::Unreachable => "unreachable",
            FailureKind::Rejected => "rejected",
        }
    }
}

/// Failures talking to the scraping service.
#[derive(Debug, thiserror::Error)]
pub enum RemoteServiceError {
    /// Rejected locally; no request was sent.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("service at {endpoint} is unreachable: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("service at {endpoint} rejected the request with status {status}: {body}")]
    Rejected {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
}

impl RemoteServiceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RemoteServiceError::InvalidRequest { .. } => FailureKind::InvalidRequest,
            RemoteServiceError::Unreachable { .. } => FailureKind::Unreachable,
            RemoteServiceError::Rejected { .. } => FailureKind::Rejected,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RemoteServiceError::InvalidRequest {
            reason: reason.into(),
        }
    }
}
