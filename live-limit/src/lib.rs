/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */
#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! Bound how many asynchronous operations are in flight at the same time.
//!
//! A [`Limiter`] owns a fixed number of slots. Every call to [`Limiter::limit`]
//! either claims a free slot and runs its operation, waits for a slot to free up
//! ([`OverflowPolicy::Queue`](types::OverflowPolicy::Queue), the default), or is
//! dropped without running ([`OverflowPolicy::Drop`](types::OverflowPolicy::Drop)).
//!
//! A limiter is meant to be shared. Construct it once for the resource being protected
//! (e.g. outbound requests to a single host) and hand clones to every call site; clones
//! share the same slots.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> Result<(), live_limit::error::Error> {
//! use live_limit::types::Outcome;
//! use live_limit::{Config, Limiter};
//!
//! let limiter = Limiter::new(Config::builder().max_concurrent(3).build())?;
//!
//! let outcome = limiter
//!     .limit(|| async { Ok::<_, std::io::Error>("response") })
//!     .await;
//!
//! match outcome {
//!     Ok(Outcome::Completed(response)) => println!("got {response}"),
//!     Ok(Outcome::Dropped) => println!("limiter was full"),
//!     Err(err) => println!("operation failed: {err}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Load the configuration from the environment instead:
//!
//! ```no_run
//! # fn example() -> Result<(), live_limit::error::Error> {
//! let config = live_limit::from_env().load()?;
//! let limiter = live_limit::Limiter::new(config)?;
//! # Ok(())
//! # }
//! ```

pub(crate) const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Error types emitted by `live-limit`
pub mod error;

/// Common types used by `live-limit`
pub mod types;

/// Limiter configuration
pub mod config;

/// The limiter
pub mod limiter;

/// Limiter metrics
pub mod metrics;

/// Tower middleware backed by a [`Limiter`]
pub mod middleware;

mod runtime;

pub use self::config::Config;
pub use self::limiter::Limiter;

use self::config::loader::ConfigLoader;

/// Returns a config loader that fills any unset field from the environment.
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}
