// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A well known directory within an installation prefix.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PrefixRole {
    Bin,
    Sbin,
    Lib,
    Lib64,
    Include,
    Share,
    Man,
    Etc,
    Libexec,
    Pkgconfig,
}

impl PrefixRole {
    /// The location of this directory relative to the prefix root.
    pub fn relative_path(&self) -> &'static str {
        match self {
            PrefixRole::Bin => "bin",
            PrefixRole::Sbin => "sbin",
            PrefixRole::Lib => "lib",
            PrefixRole::Lib64 => "lib64",
            PrefixRole::Include => "include",
            PrefixRole::Share => "share",
            PrefixRole::Man => "share/man",
            PrefixRole::Etc => "etc",
            PrefixRole::Libexec => "libexec",
            PrefixRole::Pkgconfig => "lib/pkgconfig",
        }
    }

    pub fn join<P: AsRef<Path>>(&self, prefix: P) -> PathBuf {
        prefix.as_ref().join(self.relative_path())
    }

    pub fn all() -> impl Iterator<Item = PrefixRole> {
        PrefixRole::iter()
    }
}

/// The root directory that one package is installed into.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InstallPrefix(PathBuf);

impl InstallPrefix {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self(root.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn role(&self, role: PrefixRole) -> PathBuf {
        role.join(&self.0)
    }
}

impl std::fmt::Display for InstallPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.display().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::{InstallPrefix, PrefixRole};

    #[rstest]
    #[case(PrefixRole::Bin, "/opt/zlib/bin")]
    #[case(PrefixRole::Man, "/opt/zlib/share/man")]
    #[case(PrefixRole::Pkgconfig, "/opt/zlib/lib/pkgconfig")]
    fn test_role_paths(#[case] role: PrefixRole, #[case] expected: &str) {
        let prefix = InstallPrefix::new("/opt/zlib");
        assert_eq!(prefix.role(role).to_string_lossy(), expected);
    }

    #[rstest]
    fn test_role_names_round_trip() {
        for role in PrefixRole::all() {
            assert_eq!(PrefixRole::from_str(&role.to_string()).unwrap(), role);
        }
    }
}
