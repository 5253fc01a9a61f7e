//! Tower middleware that applies [`normalize`](crate::credential_header::normalize) to every
//! request before it is handed to the wrapped transport.

use std::task::{Context, Poll};

use tower::{Layer, Service};

use crate::{credential_header::normalize, outgoing_request::OutgoingRequest};

/// Wraps a transport in [`NormalizeCredentialHeader`].
///
/// Register it once on the client that talks to the chat platform. As the rewrite is idempotent,
/// stacking it multiple times is harmless, but it is also pointless.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalizeCredentialHeaderLayer;

impl NormalizeCredentialHeaderLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for NormalizeCredentialHeaderLayer {
    type Service = NormalizeCredentialHeader<S>;

    fn layer(&self, inner: S) -> Self::Service {
        NormalizeCredentialHeader::new(inner)
    }
}

/// Readiness, responses and errors are the ones of the inner service, untouched. We only ever
/// modify the request headers and then forward the call.
#[derive(Clone, Debug)]
pub struct NormalizeCredentialHeader<S> {
    inner: S,
}

impl<S> NormalizeCredentialHeader<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S, R> Service<R> for NormalizeCredentialHeader<S>
where
    S: Service<R>,
    R: OutgoingRequest,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: R) -> Self::Future {
        self.inner.call(normalize(request))
    }
}
