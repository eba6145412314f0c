/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::task::Poll;

use tower::Service;

use super::future::ResponseFuture;
use crate::types::Outcome;
use crate::Limiter;

/// Enforces a limit on the concurrent requests an underlying service receives
/// using the given [`Limiter`].
#[derive(Debug)]
pub struct LiveLimit<T> {
    inner: T,
    limiter: Limiter,
}

impl<T> LiveLimit<T> {
    /// Create a new concurrency limiter
    pub fn new(inner: T, limiter: Limiter) -> Self {
        LiveLimit { inner, limiter }
    }

    /// The limiter this service admits requests through
    pub fn limiter(&self) -> &Limiter {
        &self.limiter
    }
}

impl<S, Request> Service<Request> for LiveLimit<S>
where
    S: Service<Request> + Clone,
{
    type Response = Outcome<S::Response>;
    type Error = S::Error;
    type Future = ResponseFuture<S, Request>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        // Admission may drop the request instead of waiting, which `poll_ready` can't express,
        // so the slot is claimed in `call()`. Calling inner.poll_ready() here would reserve
        // inner capacity well before we hold a slot, and would be invalidated by cloning it.
        // Instead, signal readiness here and treat the service as a oneshot later.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        ResponseFuture::new(self.inner.clone(), req, self.limiter.acquire())
    }
}

impl<T: Clone> Clone for LiveLimit<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: self.limiter.clone(),
        }
    }
}
