/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::config::Builder;
use crate::error;
use crate::types::OverflowPolicy;
use crate::Config;

/// Environment variable holding the maximum number of in-flight operations
pub const MAX_CONCURRENT_ENV: &str = "LIVE_LIMIT_MAX_CONCURRENT";

/// Environment variable holding the overflow policy (`queue` or `drop`)
pub const OVERFLOW_POLICY_ENV: &str = "LIVE_LIMIT_OVERFLOW_POLICY";

/// Load limiter [`Config`] from the environment.
///
/// Values set explicitly on the loader win over the environment. Anything left unset and
/// absent from the environment falls back to the [`Builder`] defaults.
#[derive(Default, Debug)]
pub struct ConfigLoader {
    max_concurrent: Option<usize>,
    overflow_policy: Option<OverflowPolicy>,
}

impl ConfigLoader {
    /// Set the maximum number of operations allowed in flight at once, ignoring
    /// `LIVE_LIMIT_MAX_CONCURRENT`.
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = Some(max_concurrent);
        self
    }

    /// Set the overflow policy, ignoring `LIVE_LIMIT_OVERFLOW_POLICY`.
    pub fn overflow_policy(mut self, overflow_policy: OverflowPolicy) -> Self {
        self.overflow_policy = Some(overflow_policy);
        self
    }

    /// Load the configuration
    ///
    /// Fails if an environment value cannot be parsed or the resulting configuration is
    /// invalid (e.g. `LIVE_LIMIT_MAX_CONCURRENT=0`, `-1` or `2.5`).
    pub fn load(self) -> Result<Config, error::Error> {
        self.load_with(|key| std::env::var(key).ok())
    }

    fn load_with<F>(self, env: F) -> Result<Config, error::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Builder::default();

        match (self.max_concurrent, env(MAX_CONCURRENT_ENV)) {
            (Some(max_concurrent), _) => builder = builder.max_concurrent(max_concurrent),
            (None, Some(value)) => builder = builder.max_concurrent(parse_max_concurrent(&value)?),
            (None, None) => {}
        }

        match (self.overflow_policy, env(OVERFLOW_POLICY_ENV)) {
            (Some(policy), _) => builder = builder.overflow_policy(policy),
            (None, Some(value)) => builder = builder.overflow_policy(value.parse()?),
            (None, None) => {}
        }

        let config = builder.build();
        config.validate()?;
        tracing::debug!(
            max_concurrent = config.max_concurrent(),
            overflow_policy = config.overflow_policy().as_str(),
            "loaded limiter config"
        );
        Ok(config)
    }
}

/// Parse a textual `max_concurrent`, rejecting anything that isn't a positive integer
fn parse_max_concurrent(value: &str) -> Result<usize, error::Error> {
    let parsed = value.trim().parse::<usize>().map_err(|err| {
        error::invalid_configuration(format!(
            "{} must be a positive integer, got '{}': {}",
            MAX_CONCURRENT_ENV, value, err
        ))
    })?;

    if parsed == 0 {
        return Err(error::invalid_configuration(format!(
            "{} must be a positive integer, got '{}'",
            MAX_CONCURRENT_ENV, value
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{ConfigLoader, MAX_CONCURRENT_ENV, OVERFLOW_POLICY_ENV};
    use crate::error::ErrorKind;
    use crate::types::OverflowPolicy;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_from_env() {
        let config = ConfigLoader::default()
            .load_with(env(&[
                (MAX_CONCURRENT_ENV, "3"),
                (OVERFLOW_POLICY_ENV, "Drop"),
            ]))
            .unwrap();
        assert_eq!(3, config.max_concurrent());
        assert_eq!(OverflowPolicy::Drop, config.overflow_policy());
    }

    #[test]
    fn test_explicit_values_override_env() {
        let config = ConfigLoader::default()
            .max_concurrent(5)
            .overflow_policy(OverflowPolicy::Queue)
            .load_with(env(&[
                (MAX_CONCURRENT_ENV, "not-a-number"),
                (OVERFLOW_POLICY_ENV, "drop"),
            ]))
            .unwrap();
        assert_eq!(5, config.max_concurrent());
        assert_eq!(OverflowPolicy::Queue, config.overflow_policy());
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ConfigLoader::default().load_with(env(&[])).unwrap();
        assert_eq!(crate::DEFAULT_MAX_CONCURRENT, config.max_concurrent());
        assert_eq!(OverflowPolicy::Queue, config.overflow_policy());
    }

    #[test]
    fn test_rejects_non_positive_or_non_integer_max() {
        for bad in ["0", "-1", "2.5", "abc", ""] {
            let err = ConfigLoader::default()
                .load_with(env(&[(MAX_CONCURRENT_ENV, bad)]))
                .unwrap_err();
            assert_eq!(&ErrorKind::InvalidConfiguration, err.kind(), "value: {bad:?}");
        }
    }

    #[test]
    fn test_explicit_zero_is_rejected() {
        let err = ConfigLoader::default()
            .max_concurrent(0)
            .load_with(env(&[]))
            .unwrap_err();
        assert_eq!(&ErrorKind::InvalidConfiguration, err.kind());
    }
}
