use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tokio::time::Sleep;
use tower::{Layer, Service};

use crate::utils::deadline::Deadline;
use crate::utils::error::AppError;

/// Stamps every request with a [`Deadline`] and answers with a 500 if the
/// inner service hasn't responded by then.
///
/// The inner future is dropped when the deadline passes, which cancels any
/// storage call still in flight for the request.
#[derive(Clone)]
pub struct RequestDeadlineLayer {
    timeout: Duration,
}

impl RequestDeadlineLayer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl<S> Layer<S> for RequestDeadlineLayer {
    type Service = RequestDeadlineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestDeadlineService {
            inner,
            timeout: self.timeout,
        }
    }
}

#[derive(Clone)]
pub struct RequestDeadlineService<S> {
    inner: S,
    timeout: Duration,
}

impl<S, ReqBody> Service<Request<ReqBody>> for RequestDeadlineService<S>
where
    S: Service<Request<ReqBody>, Response = Response>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = RequestDeadlineFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let deadline = Deadline::after(self.timeout);
        request.extensions_mut().insert(deadline);

        RequestDeadlineFuture {
            future: self.inner.call(request),
            sleep: tokio::time::sleep_until(deadline.instant()),
        }
    }
}

#[pin_project::pin_project]
pub struct RequestDeadlineFuture<F> {
    #[pin]
    future: F,
    #[pin]
    sleep: Sleep,
}

impl<F, E> Future for RequestDeadlineFuture<F>
where
    F: Future<Output = Result<Response, E>>,
{
    type Output = Result<Response, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if let Poll::Ready(result) = this.future.poll(cx) {
            return Poll::Ready(result);
        }

        match this.sleep.poll(cx) {
            Poll::Ready(()) => Poll::Ready(Ok(AppError::RequestTimeout.into_response())),
            Poll::Pending => Poll::Pending,
        }
    }
}
