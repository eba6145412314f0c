/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::str::FromStr;

/// What to do with a call that arrives while every slot is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Wait until a slot frees up, then run the call.
    #[default]
    Queue,

    /// Give up on the call immediately. The operation is never run, even if a slot frees up
    /// later.
    Drop,
}

impl OverflowPolicy {
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            OverflowPolicy::Queue => "queue",
            OverflowPolicy::Drop => "drop",
        }
    }
}

impl AsRef<str> for OverflowPolicy {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for OverflowPolicy {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let policy = match s.trim().to_ascii_lowercase().as_str() {
            "queue" => OverflowPolicy::Queue,
            "drop" => OverflowPolicy::Drop,
            _ => {
                return Err(crate::error::invalid_configuration(format!(
                    "unknown overflow policy '{}', expected 'queue' or 'drop'",
                    s
                )))
            }
        };
        Ok(policy)
    }
}

/// The result of a call that went through a [`Limiter`](crate::Limiter) without failing.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<T> {
    /// The operation was admitted and produced this value.
    Completed(T),

    /// The limiter was full under [`OverflowPolicy::Drop`]; the operation never ran.
    Dropped,
}

impl<T> Outcome<T> {
    /// Returns `true` if the operation ran to completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// Returns `true` if the call was dropped without running the operation.
    pub fn is_dropped(&self) -> bool {
        matches!(self, Outcome::Dropped)
    }

    /// Converts into the produced value, or `None` if the call was dropped.
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Dropped => None,
        }
    }

    /// Maps the produced value, leaving a dropped outcome untouched.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Dropped => Outcome::Dropped,
        }
    }
}

impl<T> From<Outcome<T>> for Option<T> {
    fn from(value: Outcome<T>) -> Self {
        value.completed()
    }
}
