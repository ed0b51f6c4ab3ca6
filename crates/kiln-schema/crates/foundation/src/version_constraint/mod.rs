// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

mod error;
pub mod parsing;

use std::str::FromStr;

pub use error::{Error, Result};
use itertools::Itertools;
use nom::combinator::all_consuming;
use nom::error::VerboseError;
pub use parsing::RawItem;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::{parse_version, Compatibility, InvalidVersionError, Version};

#[cfg(test)]
#[path = "./version_constraint_test.rs"]
mod version_constraint_test;

/// One alternative of a [`VersionConstraint`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ConstraintItem {
    /// The version itself or any version it is a segment prefix of.
    Prefix(Version),
    /// Exactly this version.
    Exact(Version),
    /// An inclusive range, either side possibly unbounded. The upper
    /// bound also admits versions it is a segment prefix of.
    Range {
        lower: Option<Version>,
        upper: Option<Version>,
    },
}

impl ConstraintItem {
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        match self {
            ConstraintItem::Prefix(v) => v.is_prefix_of(version),
            ConstraintItem::Exact(v) => v == version,
            ConstraintItem::Range { lower, upper } => {
                let above = lower.as_ref().is_none_or(|lower| version >= lower);
                let below = upper
                    .as_ref()
                    .is_none_or(|upper| version <= upper || upper.is_prefix_of(version));
                above && below
            }
        }
    }

    /// The version this item names outright, if any.
    pub fn named_version(&self) -> Option<&Version> {
        match self {
            ConstraintItem::Prefix(v) | ConstraintItem::Exact(v) => Some(v),
            ConstraintItem::Range { .. } => None,
        }
    }
}

impl std::fmt::Display for ConstraintItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintItem::Prefix(v) => v.fmt(f),
            ConstraintItem::Exact(v) => write!(f, "={v}"),
            ConstraintItem::Range { lower, upper } => {
                if let Some(lower) = lower {
                    lower.fmt(f)?;
                }
                f.write_str(":")?;
                if let Some(upper) = upper {
                    upper.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

/// A union of version alternatives, as written after `@` in a spec.
///
/// An empty constraint admits every version.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct VersionConstraint {
    items: Vec<ConstraintItem>,
}

impl VersionConstraint {
    /// A constraint that admits every version.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn exact(version: Version) -> Self {
        Self {
            items: vec![ConstraintItem::Exact(version)],
        }
    }

    pub fn new(items: Vec<ConstraintItem>) -> Self {
        Self { items }
    }

    /// Validate the versions of a parsed constraint.
    pub fn from_raw(items: &[RawItem<'_>]) -> Result<Self> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(match item {
                RawItem::Prefix(v) => ConstraintItem::Prefix(parse_version(v)?),
                RawItem::Exact(v) => ConstraintItem::Exact(parse_version(v)?),
                RawItem::Range(lower, upper) => {
                    let lower = lower.map(parse_version).transpose()?;
                    let upper = upper.map(parse_version).transpose()?;
                    if let (Some(l), Some(u)) = (&lower, &upper) {
                        if l > u && !u.is_prefix_of(l) {
                            return Err(InvalidVersionError::new_error(format!(
                                "invalid version range {l}:{u}, lower bound is greater than upper bound"
                            ))
                            .into());
                        }
                    }
                    ConstraintItem::Range { lower, upper }
                }
            });
        }
        Ok(Self { items: out })
    }

    pub fn items(&self) -> &[ConstraintItem] {
        &self.items
    }

    pub fn is_any(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        self.is_any() || self.items.iter().any(|i| i.is_satisfied_by(version))
    }

    /// Check a version, describing the failure if it is not admitted.
    pub fn check(&self, version: &Version) -> Compatibility {
        if self.is_satisfied_by(version) {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!("version {version} is not in @{self}"))
        }
    }

    /// True if this constraint names the given version outright
    /// rather than admitting it as part of a range or prefix.
    pub fn names_exactly(&self, version: &Version) -> bool {
        self.items
            .iter()
            .filter_map(ConstraintItem::named_version)
            .any(|v| v == version)
    }
}

impl std::fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.items.iter().join(","))
    }
}

impl FromStr for VersionConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::any());
        }
        let (_, items) = all_consuming(parsing::version_constraint::<VerboseError<&str>>)(s)
            .map_err(|_| {
                crate::version::Error::from(InvalidVersionError {
                    message: format!("invalid version constraint '{s}'"),
                })
            })?;
        Self::from_raw(&items)
    }
}

impl From<Version> for VersionConstraint {
    fn from(version: Version) -> Self {
        Self::exact(version)
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionConstraint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
