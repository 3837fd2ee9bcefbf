use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::time::error::Elapsed;
use tokio::time::Instant;

/// Outer bound applied when a request reaches a handler without a deadline
/// stamped by the gateway layer.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Absolute point in time after which an in-flight operation is abandoned.
///
/// A deadline is created once per request by the gateway and handed down
/// explicitly: the service narrows it for each storage call with
/// [`Deadline::tighten`] and the adapter enforces it with [`Deadline::run`].
/// Narrowing never extends a deadline, so a slow database can't keep a request
/// alive past its outer bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Returns the earlier of this deadline and `now + budget`.
    pub fn tighten(self, budget: Duration) -> Self {
        self.min(Self::after(budget))
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Drives `future` to completion unless the deadline passes first, in
    /// which case the future is dropped.
    pub async fn run<F>(self, future: F) -> Result<F::Output, Elapsed>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.at, future).await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Deadline
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Deadline>()
            .copied()
            .unwrap_or_else(|| Deadline::after(DEFAULT_REQUEST_TIMEOUT)))
    }
}
