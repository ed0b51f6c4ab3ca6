// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use indexmap::IndexMap;
use kiln_schema::PatchSource;
use kiln_solve::ConcreteSpec;
use serde::Serialize;

use crate::error::PatchAmbiguity;

#[cfg(test)]
#[path = "./select_test.rs"]
mod select_test;

/// A patch that applies to one build.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AppliedPatch {
    #[serde(flatten)]
    pub source: PatchSource,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

impl AppliedPatch {
    /// The arguments to `patch` that apply this patch from the
    /// directory it should be run in.
    pub fn patch_args(&self) -> Vec<String> {
        let file = match &self.source {
            PatchSource::File { file } => file.clone(),
            // downloaded patches are staged under their own file name
            PatchSource::Url { url, .. } => url.rsplit('/').next().unwrap_or(url.as_str()).to_string(),
        };
        vec![
            "patch".to_string(),
            format!("-p{}", self.level),
            "-i".to_string(),
            file,
        ]
    }
}

/// How a staged download is placed into the build area.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Unpacked into its destination.
    Archive,
    /// Copied into its destination as is.
    Verbatim,
}

impl From<bool> for ResourceKind {
    fn from(expand: bool) -> Self {
        if expand {
            ResourceKind::Archive
        } else {
            ResourceKind::Verbatim
        }
    }
}

/// Something an executor must download before a build starts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StagedResource {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Relative to the root of the unpacked source, empty for the root itself.
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    pub kind: ResourceKind,
}

/// Collect the patches that apply to a resolved package, in the
/// order that its recipe declares them.
///
/// Patches that share an exclusive group must partition the builds
/// they apply to. When more than one of a group matches, every such
/// group is reported instead.
pub fn select_patches(
    spec: &ConcreteSpec,
) -> std::result::Result<Vec<AppliedPatch>, Vec<PatchAmbiguity>> {
    let context = spec.context();
    let mut selected = Vec::new();
    let mut groups: IndexMap<&str, Vec<String>> = IndexMap::new();
    for decl in spec.recipe().patches() {
        if !decl.when.matches(&context) {
            tracing::trace!(package = %spec.name(), patch = %decl.source, "patch does not apply");
            continue;
        }
        if let Some(group) = &decl.exclusive {
            groups
                .entry(group.as_str())
                .or_default()
                .push(decl.source.to_string());
        }
        selected.push(AppliedPatch {
            source: decl.source.clone(),
            level: decl.level,
            working_dir: decl.working_dir.clone(),
        });
    }

    let ambiguities: Vec<_> = groups
        .into_iter()
        .filter(|(_, patches)| patches.len() > 1)
        .map(|(group, patches)| PatchAmbiguity {
            package: spec.name().to_string(),
            group: group.to_string(),
            patches,
        })
        .collect();
    if ambiguities.is_empty() {
        Ok(selected)
    } else {
        Err(ambiguities)
    }
}

/// Collect the extra downloads that apply to a resolved package,
/// in the order that its recipe declares them.
pub fn select_resources(spec: &ConcreteSpec) -> Vec<StagedResource> {
    let context = spec.context();
    spec.recipe()
        .resources()
        .iter()
        .filter(|decl| decl.when.matches(&context))
        .map(|decl| StagedResource {
            name: decl.name.clone(),
            url: decl.url.clone(),
            sha256: decl.sha256.clone(),
            destination: decl.destination.clone(),
            placement: decl.placement.clone(),
            kind: decl.expand.into(),
        })
        .collect()
}

/// The main source download of a resolved package, if it has code
/// and its recipe says where to find it.
pub fn source_archive(spec: &ConcreteSpec) -> Option<StagedResource> {
    let recipe = spec.recipe();
    if !recipe.has_code() {
        return None;
    }
    let context = spec.context();
    let url = recipe.url_for_version(spec.version(), &context)?;
    let entry = recipe.version_entry(spec.version(), &context);
    Some(StagedResource {
        name: spec.name().to_string(),
        url,
        sha256: entry.and_then(|e| e.sha256.clone()),
        destination: String::new(),
        placement: None,
        kind: entry.map(|e| e.expand).unwrap_or(true).into(),
    })
}
