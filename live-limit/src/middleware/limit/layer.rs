/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::Limiter;
use tower::Layer;

use super::service::LiveLimit;

/// Enforces a limit on the concurrent number of requests the underlying
/// service can handle.
#[derive(Debug, Clone)]
pub struct LiveLimitLayer {
    limiter: Limiter,
}

impl LiveLimitLayer {
    /// Create a new layer sharing the slots of `limiter`.
    pub const fn new(limiter: Limiter) -> Self {
        LiveLimitLayer { limiter }
    }
}

impl<S> Layer<S> for LiveLimitLayer {
    type Service = LiveLimit<S>;

    fn layer(&self, service: S) -> Self::Service {
        LiveLimit::new(service, self.limiter.clone())
    }
}
