/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::limiter::{AcquireSlot, OwnedSlot};
use crate::types::Outcome;

use futures_util::ready;
use pin_project_lite::pin_project;
use std::{future::Future, task::Poll};
use tower::util::Oneshot;
use tower::Service;

pin_project! {
    /// Response future for [`LiveLimit`](super::LiveLimit).
    #[derive(Debug)]
    pub struct ResponseFuture<S, Request>
        where S: Service<Request>
    {
        request: Option<Request>,
        svc: Option<S>,
        #[pin]
        state: State<Oneshot<S, Request>>
    }
}

pin_project! {
    #[project = StateProj]
    #[derive(Debug)]
    enum State<F> {
        // Polling the future from [`Limiter::acquire`]
        AcquiringSlot {
            #[pin]
            acquire: AcquireSlot
        },
        // Polling the future from [`Service::call`]
        Called {
            #[pin]
            fut: F,
            // retain until the inner future settles
            _slot: OwnedSlot,
        },
        // Output has been returned and the slot released
        Complete,
    }
}

impl<S, Request> ResponseFuture<S, Request>
where
    S: Service<Request>,
{
    pub(crate) fn new(inner: S, req: Request, acquire: AcquireSlot) -> ResponseFuture<S, Request> {
        ResponseFuture {
            request: Some(req),
            svc: Some(inner),
            state: State::AcquiringSlot { acquire },
        }
    }
}

impl<S, Request> Future for ResponseFuture<S, Request>
where
    S: Service<Request>,
{
    type Output = Result<Outcome<S::Response>, S::Error>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        loop {
            match this.state.as_mut().project() {
                StateProj::AcquiringSlot { acquire } => match ready!(acquire.poll(cx)) {
                    Some(_slot) => {
                        let req = this.request.take().expect("request set");
                        let svc = this.svc.take().expect("service set");
                        // NOTE: the service was never polled for readiness and was cloned, so
                        // drive it as a oneshot now that we hold a slot.
                        let fut = Oneshot::new(svc, req);
                        this.state.set(State::Called { fut, _slot });
                    }
                    None => {
                        tracing::trace!("request dropped by limiter");
                        this.request.take();
                        this.svc.take();
                        this.state.set(State::Complete);
                        return Poll::Ready(Ok(Outcome::Dropped));
                    }
                },
                StateProj::Called { fut, .. } => {
                    let result = ready!(fut.poll(cx));
                    this.state.set(State::Complete);
                    return Poll::Ready(result.map(Outcome::Completed));
                }
                StateProj::Complete => panic!("ResponseFuture polled after completion"),
            }
        }
    }
}
