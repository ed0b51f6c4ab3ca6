// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::compiler::CompilerConstraint;
use crate::foundation::name::{PkgNameBuf, VariantNameBuf};
use crate::foundation::variant_map::{VariantMap, VariantValue};
use crate::foundation::version_constraint::VersionConstraint;
use crate::parsing::{self, RawSpec};
use crate::{Error, PackageRecipe, Predicate, Result};

#[cfg(test)]
#[path = "./request_test.rs"]
mod request_test;

/// A request for a package: its name plus the constraints any
/// concrete instance must satisfy.
///
/// Requests are parsed from strings such as
/// `bazel@4:+nodepfail %gcc@9: target=x86_64 ^java@11`, or built up
/// with [`PkgRequest::new`] and the `with_*` methods. Dependency
/// clauses (`^java@11`) constrain the named package wherever it
/// appears in the resolved graph.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PkgRequest {
    pub name: PkgNameBuf,
    pub constraints: Predicate,
    pub dependencies: Vec<PkgRequest>,
}

impl PkgRequest {
    pub fn new(name: PkgNameBuf) -> Self {
        Self {
            name,
            constraints: Predicate::always(),
            dependencies: Vec::new(),
        }
    }

    pub fn versions(&self) -> &VersionConstraint {
        &self.constraints.versions
    }

    pub fn variants(&self) -> &VariantMap {
        &self.constraints.variants
    }

    pub fn compiler(&self) -> Option<&CompilerConstraint> {
        self.constraints.compiler.as_ref()
    }

    pub fn platform(&self) -> Option<&str> {
        self.constraints.platform.as_deref()
    }

    pub fn arch(&self) -> Option<&str> {
        self.constraints.arch.as_deref()
    }

    pub fn with_versions(mut self, versions: VersionConstraint) -> Self {
        self.constraints.versions = versions;
        self
    }

    pub fn with_variant<V: Into<VariantValue>>(mut self, name: VariantNameBuf, value: V) -> Self {
        self.constraints.variants.insert(name, value.into());
        self
    }

    pub fn with_compiler(mut self, compiler: CompilerConstraint) -> Self {
        self.constraints.compiler = Some(compiler);
        self
    }

    pub fn with_platform<S: Into<String>>(mut self, platform: S) -> Self {
        self.constraints.platform = Some(platform.into());
        self
    }

    pub fn with_arch<S: Into<String>>(mut self, arch: S) -> Self {
        self.constraints.arch = Some(arch.into());
        self
    }

    pub fn with_dependency(mut self, dependency: PkgRequest) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Ensure that every variant this request names is declared by
    /// the recipe and given a value it allows.
    pub fn validate_against(&self, recipe: &PackageRecipe, requester: &str) -> Result<()> {
        recipe.validate_variants(self.variants(), requester)
    }

    fn from_raw(source: &str, raw: &RawSpec<'_>) -> Result<Self> {
        let Some(name) = raw.name else {
            return Err(Error::InvalidSpec {
                spec: source.to_string(),
                message: "a request must start with a package name".to_string(),
            });
        };
        let mut dependencies = Vec::with_capacity(raw.dependencies.len());
        for dep in raw.dependencies.iter() {
            dependencies.push(Self::from_raw(source, dep)?);
        }
        Ok(Self {
            name: PkgNameBuf::new(name)?,
            constraints: Predicate::from_clauses(source, &raw.clauses)?,
            dependencies,
        })
    }
}

impl FromStr for PkgRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = parsing::parse_all(s, parsing::request)?;
        Self::from_raw(s, &raw)
    }
}

impl std::fmt::Display for PkgRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        let constraints = self.constraints.to_string();
        if constraints.starts_with(['@', '+', '~']) {
            f.write_str(&constraints)?;
        } else if !constraints.is_empty() {
            write!(f, " {constraints}")?;
        }
        for dep in self.dependencies.iter() {
            write!(f, " ^{dep}")?;
        }
        Ok(())
    }
}

impl Serialize for PkgRequest {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PkgRequest {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
