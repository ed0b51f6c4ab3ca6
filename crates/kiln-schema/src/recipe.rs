// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::BTreeSet;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::foundation::name::{PkgNameBuf, VariantNameBuf};
use crate::foundation::variant_map::VariantMap;
use crate::foundation::version::Version;
use crate::{
    BuildSystem,
    EnvDecl,
    Error,
    HookDecl,
    MatchContext,
    PatchDecl,
    Phase,
    PhaseArgDecl,
    PkgRequest,
    Predicate,
    ResourceDecl,
    Result,
    VariantDecl,
};

#[cfg(test)]
#[path = "./recipe_test.rs"]
mod recipe_test;

/// Descriptive information about a package.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// One known release of a package.
///
/// The `when` predicate may only look at the platform, architecture
/// and compiler; it is how per-platform download tables are written.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionEntry {
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Overrides the recipe's url template for this release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_true")]
    pub expand: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub preferred: bool,
    #[serde(default, skip_serializing_if = "Predicate::is_always")]
    pub when: Predicate,
}

fn default_true() -> bool {
    true
}

impl VersionEntry {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            sha256: None,
            url: None,
            expand: true,
            deprecated: false,
            preferred: false,
            when: Predicate::always(),
        }
    }

    pub fn with_sha256<S: Into<String>>(mut self, sha256: S) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }

    pub fn when(mut self, when: Predicate) -> Self {
        self.when = when;
        self
    }
}

/// How a dependency is used by the package that declares it.
#[derive(
    Clone, Copy, Debug, Display, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DepType {
    Build,
    Link,
    Run,
    Test,
}

/// A non-empty set of [`DepType`]s, `build` and `link` by default.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DepTypes(BTreeSet<DepType>);

impl Default for DepTypes {
    fn default() -> Self {
        Self([DepType::Build, DepType::Link].into_iter().collect())
    }
}

impl DepTypes {
    pub fn new<I: IntoIterator<Item = DepType>>(types: I) -> Self {
        let types: BTreeSet<_> = types.into_iter().collect();
        if types.is_empty() {
            Self::default()
        } else {
            Self(types)
        }
    }

    pub fn contains(&self, dep_type: DepType) -> bool {
        self.0.contains(&dep_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = DepType> + '_ {
        self.0.iter().copied()
    }

    pub fn merge(&mut self, other: &DepTypes) {
        self.0.extend(other.0.iter().copied());
    }

    /// True if the dependency only matters for running tests.
    pub fn is_test_only(&self) -> bool {
        self.0.iter().all(|t| *t == DepType::Test)
    }
}

impl std::fmt::Display for DepTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.iter().join(","))
    }
}

impl<'de> Deserialize<'de> for DepTypes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(DepType),
            Many(Vec<DepType>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(t) => DepTypes::new([t]),
            OneOrMany::Many(types) => DepTypes::new(types),
        })
    }
}

/// A dependency that applies when `when` matches the declaring package.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyDecl {
    pub spec: PkgRequest,
    #[serde(default, skip_serializing_if = "Predicate::is_always")]
    pub when: Predicate,
    #[serde(default, rename = "type")]
    pub types: DepTypes,
}

impl DependencyDecl {
    pub fn new(spec: PkgRequest) -> Self {
        Self {
            spec,
            when: Predicate::always(),
            types: DepTypes::default(),
        }
    }

    pub fn when(mut self, when: Predicate) -> Self {
        self.when = when;
        self
    }

    pub fn types<I: IntoIterator<Item = DepType>>(mut self, types: I) -> Self {
        self.types = DepTypes::new(types);
        self
    }
}

/// A combination of settings that the recipe cannot be built with.
///
/// The conflict triggers when both `spec` and `when` match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConflictDecl {
    pub spec: Predicate,
    #[serde(default, skip_serializing_if = "Predicate::is_always")]
    pub when: Predicate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ConflictDecl {
    pub fn new(spec: Predicate) -> Self {
        Self {
            spec,
            when: Predicate::always(),
            msg: None,
        }
    }

    pub fn is_triggered(&self, context: &MatchContext<'_>) -> bool {
        self.spec.matches(context) && self.when.matches(context)
    }
}

/// The immutable definition of how to build every known version of
/// one package.
///
/// Recipes are created with a [`crate::RecipeBuilder`] or loaded from
/// yaml, both of which validate the definition as a whole.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PackageRecipe {
    pub(crate) name: PkgNameBuf,
    #[serde(flatten)]
    pub(crate) meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) url: Option<String>,
    pub(crate) build_system: BuildSystem,
    pub(crate) has_code: bool,
    pub(crate) versions: Vec<VersionEntry>,
    #[serde(
        serialize_with = "serialize_variants",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub(crate) variants: IndexMap<VariantNameBuf, VariantDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) dependencies: Vec<DependencyDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) conflicts: Vec<ConflictDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) patches: Vec<PatchDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) resources: Vec<ResourceDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) build_environment: Vec<EnvDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) run_environment: Vec<EnvDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) phase_args: Vec<PhaseArgDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) hooks: Vec<HookDecl>,
}

fn serialize_variants<S>(
    variants: &IndexMap<VariantNameBuf, VariantDecl>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(variants.values())
}

impl<'de> Deserialize<'de> for PackageRecipe {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        crate::recipe_builder::RecipeData::deserialize(deserializer)?
            .into_builder()
            .build()
            .map_err(serde::de::Error::custom)
    }
}

impl PackageRecipe {
    pub fn name(&self) -> &PkgNameBuf {
        &self.name
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn url_template(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn build_system(&self) -> BuildSystem {
        self.build_system
    }

    /// False for recipes that only group other packages.
    pub fn has_code(&self) -> bool {
        self.has_code
    }

    pub fn versions(&self) -> &[VersionEntry] {
        &self.versions
    }

    /// The entry declaring a version for the given platform, architecture
    /// and compiler. The same version may appear once per platform table.
    pub fn version_entry(&self, version: &Version, context: &MatchContext<'_>) -> Option<&VersionEntry> {
        self.versions
            .iter()
            .find(|e| &e.version == version && e.when.matches(context))
    }

    pub fn variants(&self) -> impl Iterator<Item = &VariantDecl> {
        self.variants.values()
    }

    pub fn variant(&self, name: &str) -> Option<&VariantDecl> {
        self.variants.get(name)
    }

    pub fn dependencies(&self) -> &[DependencyDecl] {
        &self.dependencies
    }

    pub fn conflicts(&self) -> &[ConflictDecl] {
        &self.conflicts
    }

    pub fn patches(&self) -> &[PatchDecl] {
        &self.patches
    }

    pub fn resources(&self) -> &[ResourceDecl] {
        &self.resources
    }

    pub fn build_environment(&self) -> &[EnvDecl] {
        &self.build_environment
    }

    pub fn run_environment(&self) -> &[EnvDecl] {
        &self.run_environment
    }

    pub fn phase_args(&self) -> &[PhaseArgDecl] {
        &self.phase_args
    }

    pub fn hooks(&self) -> &[HookDecl] {
        &self.hooks
    }

    /// Every phase that a build of this recipe goes through, in order.
    pub fn phases(&self, with_tests: bool) -> Vec<Phase> {
        let mut phases = Vec::new();
        if self.has_code {
            phases.extend([Phase::Fetch, Phase::Patch]);
        }
        phases.extend_from_slice(self.build_system.phases());
        if with_tests {
            phases.push(Phase::Test);
        }
        phases
    }

    /// The value every declared variant takes when nothing overrides it.
    pub fn default_variants(&self) -> VariantMap {
        self.variants
            .values()
            .map(|v| (v.name.clone(), v.default.clone()))
            .collect()
    }

    /// Ensure that every given variant is declared by this recipe
    /// and that its value is allowed.
    pub fn validate_variants(&self, variants: &VariantMap, requester: &str) -> Result<()> {
        for (name, value) in variants.iter() {
            let Some(decl) = self.variants.get(name) else {
                return Err(Error::UnknownVariant {
                    package: self.name.to_string(),
                    variant: name.to_string(),
                    requester: requester.to_string(),
                    known: self.variants.keys().map(ToString::to_string).collect(),
                });
            };
            if !&decl.validate(value) {
                return Err(Error::InvalidVariantValue {
                    package: self.name.to_string(),
                    variant: name.to_string(),
                    value: value.to_string(),
                    requester: requester.to_string(),
                    allowed: decl.allowed_values(),
                });
            }
        }
        Ok(())
    }

    /// Load a recipe from yaml, validating it as a whole.
    pub fn from_yaml<S: AsRef<str>>(yaml: S) -> Result<Self> {
        let data: crate::recipe_builder::RecipeData =
            serde_yaml::from_str(yaml.as_ref()).map_err(Error::RecipeEncodingError)?;
        data.into_builder().build()
    }

    /// The download location of the given release, if the recipe has one.
    pub fn url_for_version(&self, version: &Version, context: &MatchContext<'_>) -> Option<String> {
        let entry = self.version_entry(version, context);
        let template = entry
            .and_then(|e| e.url.as_deref())
            .or(self.url.as_deref())?;
        Some(crate::url::expand_url_template(
            template,
            version,
            context.platform.unwrap_or_default(),
            context.arch.unwrap_or_default(),
        ))
    }
}
