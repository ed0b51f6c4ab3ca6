// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::name::PkgNameBuf;
use crate::version::{Compatibility, Version};
use crate::version_constraint::VersionConstraint;

/// A concrete compiler identity, eg `gcc@12.2.0`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Compiler {
    pub name: PkgNameBuf,
    pub version: Version,
}

impl Compiler {
    pub fn new(name: PkgNameBuf, version: Version) -> Self {
        Self { name, version }
    }
}

impl std::fmt::Display for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl FromStr for Compiler {
    type Err = crate::version::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((name, version)) = s.split_once('@') else {
            return Err(format!("compiler must be written as <name>@<version>, got '{s}'").into());
        };
        let name = PkgNameBuf::new(name).map_err(|err| err.to_string())?;
        Ok(Self {
            name,
            version: version.parse()?,
        })
    }
}

/// A requirement on the compiler used to build a package,
/// written `%name` or `%name@constraint` in a spec.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct CompilerConstraint {
    pub name: PkgNameBuf,
    #[serde(default, skip_serializing_if = "VersionConstraint::is_any")]
    pub versions: VersionConstraint,
}

impl CompilerConstraint {
    pub fn new(name: PkgNameBuf, versions: VersionConstraint) -> Self {
        Self { name, versions }
    }

    pub fn is_satisfied_by(&self, compiler: &Compiler) -> bool {
        self.check(compiler).is_ok()
    }

    pub fn check(&self, compiler: &Compiler) -> Compatibility {
        if self.name != compiler.name {
            return Compatibility::incompatible(format!(
                "compiler {compiler} is not {}",
                self.name
            ));
        }
        self.versions.check(&compiler.version)
    }
}

impl std::fmt::Display for CompilerConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.versions.is_any() {
            write!(f, "%{}", self.name)
        } else {
            write!(f, "%{}@{}", self.name, self.versions)
        }
    }
}
