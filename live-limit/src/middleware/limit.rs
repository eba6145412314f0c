/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Limit the maximum number of requests being concurrently processed by a service.
//!
//! This middleware is similar to the `tower::limit::concurrency` middleware but goes through
//! a shared [`Limiter`](crate::Limiter), so several services (or plain
//! [`Limiter::limit`](crate::Limiter::limit) callers) can respect one ceiling. Under
//! [`OverflowPolicy::Drop`](crate::types::OverflowPolicy::Drop) excess requests resolve to
//! [`Outcome::Dropped`](crate::types::Outcome::Dropped) without reaching the inner service.

mod future;
mod layer;
mod service;

pub use self::future::ResponseFuture;
pub use self::layer::LiveLimitLayer;
pub use self::service::LiveLimit;
