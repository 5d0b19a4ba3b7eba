//! Error types for the pomgraph core library.

use std::path::PathBuf;

use crate::models::System;

/// Coarse classification of a [`ResolveError`], for callers deciding whether
/// to retry, skip, or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed something this client can never serve.
    MalformedInput,
    /// The registry was unreachable, answered with an error status, or sent
    /// an undecodable body.
    Registry,
    /// The registry answered, and the artifact does not exist there.
    NotFound,
    /// A parent chain was cyclic or deeper than the configured limit.
    Depth,
    /// Reading or writing the on-disk response cache failed.
    Cache,
    /// The caller's context was cancelled or its deadline passed.
    Cancelled,
    /// The client is offline and the response was not cached.
    Offline,
}

/// Top-level error enum for the pomgraph core library.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid Maven package name {0}")]
    InvalidCoordinate(String),

    #[error("wrong system: {0}")]
    WrongSystem(System),

    #[error("invalid registry URL {0}")]
    InvalidRegistryUrl(String),

    #[error("invalid version requirement {requirement:?}: {reason}")]
    InvalidRequirement { requirement: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} not found")]
    NotFound { url: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("parent chain of {coordinate} exceeds {max_depth} levels")]
    ParentDepthExceeded { coordinate: String, max_depth: usize },

    #[error("a cycle of parents is detected at {0}")]
    ParentCycle(String),

    #[error("parent identifiers mismatch: got {found}, expected {expected}")]
    ParentMismatch { expected: String, found: String },

    #[error("invalid packaging {packaging:?} for parent project {coordinate}")]
    InvalidParentPackaging { coordinate: String, packaging: String },

    #[error("cache file {path} is incompatible: {reason}")]
    CacheFormat { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("offline mode: {url} is not cached")]
    Offline { url: String },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::InvalidCoordinate(_)
            | ResolveError::WrongSystem(_)
            | ResolveError::InvalidRegistryUrl(_)
            | ResolveError::InvalidRequirement { .. } => ErrorKind::MalformedInput,
            ResolveError::Transport { .. }
            | ResolveError::Status { .. }
            | ResolveError::MalformedResponse { .. }
            | ResolveError::ParentMismatch { .. }
            | ResolveError::InvalidParentPackaging { .. } => ErrorKind::Registry,
            ResolveError::NotFound { .. } => ErrorKind::NotFound,
            ResolveError::ParentDepthExceeded { .. } | ResolveError::ParentCycle(_) => {
                ErrorKind::Depth
            }
            ResolveError::CacheFormat { .. }
            | ResolveError::Io(_)
            | ResolveError::Sqlite(_)
            | ResolveError::Json(_) => ErrorKind::Cache,
            ResolveError::Cancelled => ErrorKind::Cancelled,
            ResolveError::Offline { .. } => ErrorKind::Offline,
        }
    }

    pub(crate) fn malformed(url: &str, reason: impl ToString) -> Self {
        ResolveError::MalformedResponse {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_separate_not_found_from_unavailable() {
        let missing = ResolveError::NotFound {
            url: "https://repo/x.pom".into(),
        };
        let broken = ResolveError::Status {
            url: "https://repo/x.pom".into(),
            status: 503,
        };
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(broken.kind(), ErrorKind::Registry);
    }

    #[test]
    fn cycles_are_depth_errors() {
        assert_eq!(
            ResolveError::ParentCycle("a:b:1".into()).kind(),
            ErrorKind::Depth
        );
    }

    #[test]
    fn display_keeps_coordinate() {
        let err = ResolveError::InvalidCoordinate("lib-without-colon".into());
        assert_eq!(err.to_string(), "invalid Maven package name lib-without-colon");
    }
}
