// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use serde::{Deserialize, Serialize};

use crate::Predicate;

/// An extra download staged alongside a package's main source,
/// such as a bundled toolchain or a set of fonts.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDecl {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Directory within the stage that the resource is placed in.
    #[serde(default)]
    pub destination: String,
    /// Name given to the resource within its destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    /// Whether the download is an archive to unpack.
    #[serde(default = "default_expand")]
    pub expand: bool,
    #[serde(default, skip_serializing_if = "Predicate::is_always")]
    pub when: Predicate,
}

fn default_expand() -> bool {
    true
}

impl ResourceDecl {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            sha256: None,
            destination: String::new(),
            placement: None,
            expand: true,
            when: Predicate::always(),
        }
    }

    pub fn when(mut self, when: Predicate) -> Self {
        self.when = when;
        self
    }
}
