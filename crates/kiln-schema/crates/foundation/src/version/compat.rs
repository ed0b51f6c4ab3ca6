// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

/// Denotes whether or not something is compatible.
#[must_use = "this `Compatibility` may be an `Incompatible` variant, which should be handled"]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Compatibility {
    Compatible,
    Incompatible(String),
}

impl std::fmt::Display for Compatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Compatibility::Compatible => f.write_str(""),
            Compatibility::Incompatible(msg) => f.write_str(msg),
        }
    }
}

impl std::ops::Not for &'_ Compatibility {
    type Output = bool;

    fn not(self) -> Self::Output {
        match self {
            Compatibility::Compatible => false,
            Compatibility::Incompatible(_) => true,
        }
    }
}

impl Compatibility {
    pub fn incompatible<S: Into<String>>(message: S) -> Self {
        Compatibility::Incompatible(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, &Compatibility::Compatible)
    }

    pub fn message(&self) -> &str {
        match self {
            Compatibility::Compatible => "",
            Compatibility::Incompatible(msg) => msg.as_ref(),
        }
    }

    /// Keep the first incompatibility of the two.
    pub fn and_then<F>(self, next: F) -> Compatibility
    where
        F: FnOnce() -> Compatibility,
    {
        match self {
            Compatibility::Compatible => next(),
            incompatible => incompatible,
        }
    }
}
