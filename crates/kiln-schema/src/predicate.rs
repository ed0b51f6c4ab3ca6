// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::compiler::CompilerConstraint;
use crate::foundation::name::{PkgNameBuf, RESERVED_VARIANT_NAMES, VariantNameBuf};
use crate::foundation::variant_map::{VariantMap, VariantValue, format_assignment};
use crate::foundation::version_constraint::VersionConstraint;
use crate::parsing::{self, RawClause, RawSpec};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./predicate_test.rs"]
mod predicate_test;

/// A conjunction of conditions over a package's version, variants,
/// compiler, platform and architecture.
///
/// Predicates are written with the same syntax as a request, minus
/// the package name, eg `@3.0:6+nodepfail %gcc@9: platform=linux`.
/// A condition that is not written always holds, so the empty
/// predicate matches everything.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Predicate {
    pub versions: VersionConstraint,
    pub variants: VariantMap,
    pub compiler: Option<CompilerConstraint>,
    pub platform: Option<String>,
    pub arch: Option<String>,
}

impl Predicate {
    /// The predicate that matches every context.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn is_always(&self) -> bool {
        self.versions.is_any()
            && self.variants.is_empty()
            && self.compiler.is_none()
            && self.platform.is_none()
            && self.arch.is_none()
    }

    /// True if this predicate only looks at the platform,
    /// architecture and compiler.
    pub fn is_environmental(&self) -> bool {
        self.versions.is_any() && self.variants.is_empty()
    }

    /// Collect validated fields from parsed clauses.
    pub(crate) fn from_clauses(source: &str, clauses: &[RawClause<'_>]) -> Result<Self> {
        let invalid = |message: String| Error::InvalidSpec {
            spec: source.to_string(),
            message,
        };
        let mut out = Predicate::default();
        let mut seen_versions = false;
        for clause in clauses {
            match clause {
                RawClause::Versions(items) => {
                    if seen_versions {
                        return Err(invalid("more than one version constraint".into()));
                    }
                    seen_versions = true;
                    out.versions = VersionConstraint::from_raw(items)?;
                }
                RawClause::Compiler(name, versions) => {
                    if out.compiler.is_some() {
                        return Err(invalid("more than one compiler".into()));
                    }
                    let versions = match versions {
                        Some(items) => VersionConstraint::from_raw(items)?,
                        None => VersionConstraint::any(),
                    };
                    out.compiler = Some(CompilerConstraint::new(PkgNameBuf::new(*name)?, versions));
                }
                RawClause::KeyValue(key, value) if RESERVED_VARIANT_NAMES.contains(key) => {
                    let (slot, value) = match *key {
                        "platform" | "os" => (&mut out.platform, *value),
                        // a target family, eg `aarch64:`, is treated as the bare target
                        _ => (&mut out.arch, value.trim_end_matches(':')),
                    };
                    if slot.as_deref().is_some_and(|v| v != value) {
                        return Err(invalid(format!("conflicting values for {key}")));
                    }
                    *slot = Some(value.to_string());
                }
                RawClause::KeyValue(key, value) => {
                    out.insert_variant(source, key, VariantValue::from(*value))?;
                }
                RawClause::Flag(name, on) => {
                    out.insert_variant(source, name, VariantValue::Bool(*on))?;
                }
            }
        }
        Ok(out)
    }

    fn insert_variant(&mut self, source: &str, name: &str, value: VariantValue) -> Result<()> {
        let name = VariantNameBuf::new(name)?;
        if let Some(existing) = self.variants.get(&name) {
            if existing != &value {
                return Err(Error::InvalidSpec {
                    spec: source.to_string(),
                    message: format!("variant '{name}' is given more than one value"),
                });
            }
        }
        self.variants.insert(name, value);
        Ok(())
    }
}

impl FromStr for Predicate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let RawSpec { clauses, .. } = parsing::parse_all(s, parsing::predicate)?;
        Self::from_clauses(s, &clauses)
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut head = String::new();
        if !self.versions.is_any() {
            head.push('@');
            head.push_str(&self.versions.to_string());
        }
        let mut parts = Vec::new();
        for (name, value) in self.variants.iter() {
            match value {
                VariantValue::Bool(_) => head.push_str(&format_assignment(name, value)),
                VariantValue::Value(_) => parts.push(format_assignment(name, value)),
            }
        }
        if !head.is_empty() {
            parts.insert(0, head);
        }
        if let Some(compiler) = &self.compiler {
            parts.push(compiler.to_string());
        }
        if let Some(platform) = &self.platform {
            parts.push(format!("platform={platform}"));
        }
        if let Some(arch) = &self.arch {
            parts.push(format!("target={arch}"));
        }
        f.write_str(&parts.join(" "))
    }
}

impl Serialize for Predicate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        match value {
            None => Ok(Predicate::always()),
            Some(value) => value.parse().map_err(serde::de::Error::custom),
        }
    }
}
