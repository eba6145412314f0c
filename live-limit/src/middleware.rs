/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Limit the number of requests a service processes concurrently
pub mod limit;

pub use self::limit::{LiveLimit, LiveLimitLayer, ResponseFuture};
