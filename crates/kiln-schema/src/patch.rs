// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use serde::{Deserialize, Serialize};

use crate::Predicate;

/// Where the content of a patch comes from.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PatchSource {
    /// A file shipped next to the recipe.
    File { file: String },
    /// A patch downloaded from a url and verified against a checksum.
    Url { url: String, sha256: String },
}

impl std::fmt::Display for PatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchSource::File { file } => f.write_str(file),
            PatchSource::Url { url, .. } => f.write_str(url),
        }
    }
}

/// A patch that a recipe applies to its source when `when` matches.
///
/// Patches sharing an `exclusive` group are alternatives of one
/// another, so at most one of them may apply to any package.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatchData")]
pub struct PatchDecl {
    #[serde(flatten)]
    pub source: PatchSource,
    #[serde(skip_serializing_if = "Predicate::is_always")]
    pub when: Predicate,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive: Option<String>,
}

impl PatchDecl {
    pub fn file<S: Into<String>>(file: S) -> Self {
        Self {
            source: PatchSource::File { file: file.into() },
            when: Predicate::always(),
            level: 1,
            working_dir: None,
            exclusive: None,
        }
    }

    pub fn url<U: Into<String>, C: Into<String>>(url: U, sha256: C) -> Self {
        Self {
            source: PatchSource::Url {
                url: url.into(),
                sha256: sha256.into(),
            },
            ..Self::file("")
        }
    }

    pub fn when(mut self, when: Predicate) -> Self {
        self.when = when;
        self
    }

    pub fn exclusive<S: Into<String>>(mut self, group: S) -> Self {
        self.exclusive = Some(group.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PatchData {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sha256: Option<String>,
    #[serde(default)]
    when: Predicate,
    #[serde(default = "default_level")]
    level: u32,
    #[serde(default)]
    working_dir: Option<String>,
    #[serde(default)]
    exclusive: Option<String>,
}

fn default_level() -> u32 {
    1
}

impl TryFrom<PatchData> for PatchDecl {
    type Error = String;

    fn try_from(data: PatchData) -> Result<Self, Self::Error> {
        let source = match (data.file, data.url, data.sha256) {
            (Some(file), None, None) => PatchSource::File { file },
            (None, Some(url), Some(sha256)) => PatchSource::Url { url, sha256 },
            (None, Some(url), None) => {
                return Err(format!("patch from {url} must give a sha256 checksum"));
            }
            _ => return Err("a patch must give either a file or a url and sha256".to_string()),
        };
        Ok(Self {
            source,
            when: data.when,
            level: data.level,
            working_dir: data.working_dir,
            exclusive: data.exclusive,
        })
    }
}
