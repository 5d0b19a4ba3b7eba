//! Caller-supplied cancellation context.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::{ResolveError, ResolveResult};

/// Cancellation scope for one or more operations.
///
/// Cancelling the token, or reaching the optional deadline, aborts any
/// in-flight registry request with [`ResolveError::Cancelled`].
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Same token, with a deadline no later than `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            token: self.token.clone(),
            deadline: Some(self.deadline.map_or(deadline, |d| d.min(deadline))),
        }
    }

    /// A context cancelled together with this one, but cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }

    /// Drive `operation` until it finishes or this context is cancelled,
    /// dropping the operation in the latter case.
    pub async fn run<T, F>(&self, operation: F) -> ResolveResult<T>
    where
        F: Future<Output = ResolveResult<T>>,
    {
        if self.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ResolveError::Cancelled),
            _ = self.expired() => Err(ResolveError::Cancelled),
            result = operation => result,
        }
    }
}
