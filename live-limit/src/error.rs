/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// Failures of the operations run through a [`Limiter`](crate::Limiter) are never
/// converted into this type; they are handed back to the caller unchanged.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of limiter errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The limiter configuration is invalid (e.g. `max_concurrent` is not a positive integer)
    InvalidConfiguration,
}

impl Error {
    /// Creates a new limiter [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InvalidConfiguration => {
                write!(f, "invalid limiter configuration: {}", self.source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

pub(crate) fn invalid_configuration<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InvalidConfiguration, err)
}

#[cfg(test)]
mod tests {
    use super::{invalid_configuration, ErrorKind};

    #[test]
    fn test_display_includes_source() {
        let err = invalid_configuration("`max_concurrent` must be a positive integer");
        assert_eq!(&ErrorKind::InvalidConfiguration, err.kind());
        assert_eq!(
            "invalid limiter configuration: `max_concurrent` must be a positive integer",
            err.to_string()
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
